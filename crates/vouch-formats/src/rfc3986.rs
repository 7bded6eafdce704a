//! # RFC 3986 Grammar Fragments
//!
//! Regex source fragments for the URI grammar of RFC 3986 and the address
//! grammars it embeds (IPv4, IPv6, IPvFuture). They are plain strings,
//! assembled into anchored expressions by [`crate::uri`] and [`crate::ip`].
//!
//! Character classes are ASCII only. Percent-encoding is accepted loosely:
//! `%` and hex digits are members of every class that admits `pct-encoded`.

const HEX_DIGIT: &str = "0-9A-Fa-f";
const ALPHA: &str = "a-zA-Z";
const DIGIT: &str = "0-9";
const UNRESERVED: &str = r"a-zA-Z0-9\-._\~";
const SUB_DELIMS: &str = r"!$\&'()*+,;=";
const PCT_ENCODED: &str = "%0-9A-Fa-f";

/// `0`-`255`, allowing up to two leading zeros.
const DEC_OCTET: &str = "(?:0?0?[0-9]|0?[1-9][0-9]|1[0-9][0-9]|2[0-4][0-9]|25[0-5])";

/// CIDR prefix length, `0`-`32`.
pub const CIDR: &str = "(?:[0-9]|[1-2][0-9]|3[0-2])";

fn pchar() -> String {
    format!("{UNRESERVED}{PCT_ENCODED}{SUB_DELIMS}:@")
}

pub fn ipv4_address() -> String {
    format!("(?:{DEC_OCTET}\\.){{3}}{DEC_OCTET}")
}

pub fn ipv6_address() -> String {
    let h16 = format!("[{HEX_DIGIT}]{{1,4}}");
    let ls32 = format!("(?:{h16}:{h16}|{})", ipv4_address());
    let forms = [
        format!("(?:{h16}:){{6}}{ls32}"),
        format!("::(?:{h16}:){{5}}{ls32}"),
        format!("(?:{h16})?::(?:{h16}:){{4}}{ls32}"),
        format!("(?:(?:{h16}:){{0,1}}{h16})?::(?:{h16}:){{3}}{ls32}"),
        format!("(?:(?:{h16}:){{0,2}}{h16})?::(?:{h16}:){{2}}{ls32}"),
        format!("(?:(?:{h16}:){{0,3}}{h16})?::{h16}:{ls32}"),
        format!("(?:(?:{h16}:){{0,4}}{h16})?::{ls32}"),
        format!("(?:(?:{h16}:){{0,5}}{h16})?::{h16}"),
        format!("(?:(?:{h16}:){{0,6}}{h16})?::"),
    ];
    format!("(?:{})", forms.join("|"))
}

pub fn ipv_future() -> String {
    format!("v[{HEX_DIGIT}]+\\.[{UNRESERVED}{SUB_DELIMS}:]+")
}

/// `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`.
pub fn scheme() -> String {
    format!("[{ALPHA}][{ALPHA}{DIGIT}+,\\-.]*")
}

fn authority() -> String {
    let userinfo = format!("[{UNRESERVED}{PCT_ENCODED}{SUB_DELIMS}:]*");
    let ip_literal = format!("\\[(?:{}|{})\\]", ipv6_address(), ipv_future());
    let reg_name = format!("[{UNRESERVED}{PCT_ENCODED}{SUB_DELIMS}]{{0,255}}");
    let host = format!("(?:{ip_literal}|{}|{reg_name})", ipv4_address());
    format!("(?:{userinfo}@)?{host}(?::[0-9]*)?")
}

fn path_abempty() -> String {
    format!("(?:/[{}]*)*", pchar())
}

fn path_absolute() -> String {
    format!("/(?:[{}]+{})?", pchar(), path_abempty())
}

/// `"//" authority path-abempty / path-absolute / path-rootless`.
pub fn hier_part() -> String {
    let path_rootless = format!("[{}]+{}", pchar(), path_abempty());
    format!(
        "(?:(?://{}{})|{}|{path_rootless})",
        authority(),
        path_abempty(),
        path_absolute()
    )
}

/// `"//" authority path-abempty / path-absolute / path-noscheme / path-empty`.
pub fn relative_ref() -> String {
    let path_noscheme = format!(
        "[{UNRESERVED}{PCT_ENCODED}{SUB_DELIMS}@]+{}",
        path_abempty()
    );
    format!(
        "(?:(?://{}{})|{}|{path_noscheme}|)",
        authority(),
        path_abempty(),
        path_absolute()
    )
}

pub fn query() -> String {
    format!("[{}/?]*", pchar())
}

pub fn fragment() -> String {
    format!("[{}/?]*", pchar())
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn anchored(fragment: &str) -> Regex {
        Regex::new(&format!("^(?:{fragment})$")).unwrap()
    }

    #[test]
    fn test_ipv4() {
        let re = anchored(&ipv4_address());
        assert!(re.is_match("127.0.0.1"));
        assert!(re.is_match("000.000.000.000"));
        assert!(!re.is_match("256.0.0.0"));
    }

    #[test]
    fn test_ipv6() {
        let re = anchored(&ipv6_address());
        for ok in ["::", "::1", "2001:db8::7", "a:b:c:d:e::1.2.3.4", "7:6:5:4:3:2:1::"] {
            assert!(re.is_match(ok), "{ok}");
        }
        assert!(!re.is_match("1080:0:0:0:8:800:200C:417G"));
    }

    #[test]
    fn test_fragments_compile() {
        for fragment in [hier_part(), relative_ref(), query(), fragment(), scheme(), ipv_future()] {
            assert!(Regex::new(&fragment).is_ok(), "{fragment}");
        }
    }
}
