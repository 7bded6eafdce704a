//! Hostnames per RFC 952 / RFC 1123, or a bare IPv6 literal.

use std::net::Ipv6Addr;

/// Longest hostname accepted, in bytes.
pub const MAX_LENGTH: usize = 255;

/// True for dot-separated letter-digit-hyphen labels, or an IPv6 address.
pub fn is_hostname(value: &str) -> bool {
    if value.parse::<Ipv6Addr>().is_ok() {
        return true;
    }
    value.len() <= MAX_LENGTH && value.split('.').all(is_label)
}

fn is_label(label: &str) -> bool {
    let bytes = label.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            first.is_ascii_alphanumeric()
                && last.is_ascii_alphanumeric()
                && bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'-')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts() {
        for host in [
            "www.example.com",
            "domain.local",
            "3domain.local",
            "hostname",
            "2387628",
            "0:0:0:0:0:0:0:1",
            "127.0.0.1",
            "2001:db8::7",
            "::1",
        ] {
            assert!(is_hostname(host), "{host}");
        }
    }

    #[test]
    fn test_rejects() {
        for host in [
            "-domain.local",
            "domain.local-",
            "a..b",
            "host:name",
            "",
            "www.example.com.",
            "2001:db8::7::1",
            "-",
            "0:?:0:0:0:0:0:1",
        ] {
            assert!(!is_hostname(host), "{host}");
        }
        let long = ["a"; 128].join(".");
        assert!(!is_hostname(&long));
        assert!(!is_hostname(&"0".repeat(256)));
        assert!(is_hostname(&"0".repeat(255)));
    }
}
