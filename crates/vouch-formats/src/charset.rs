//! Character-class checks: hex, alphanumeric, token, case.

/// One or more ASCII hex digits.
pub fn is_hex(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_hexdigit())
}

/// One or more ASCII letters or digits.
pub fn is_alphanum(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric())
}

/// One or more ASCII letters, digits or underscores.
pub fn is_token(value: &str) -> bool {
    !value.is_empty() && value.chars().all(is_word_char)
}

/// ASCII word character (`[A-Za-z0-9_]`).
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// True when lowercasing leaves `value` unchanged.
pub fn is_lowercase(value: &str) -> bool {
    value.to_lowercase() == value
}

/// True when uppercasing leaves `value` unchanged.
pub fn is_uppercase(value: &str) -> bool {
    value.to_uppercase() == value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert!(is_hex("123afe"));
        assert!(is_hex("ABCdef0"));
        assert!(!is_hex("123afg"));
        assert!(!is_hex(""));
    }

    #[test]
    fn test_alphanum_and_token() {
        assert!(is_alphanum("w0rld"));
        assert!(!is_alphanum("w0rld_"));
        assert!(!is_alphanum("w\u{e9}"));
        assert!(is_token("w0rld_of_w4lls"));
        assert!(!is_token("abc!"));
    }

    #[test]
    fn test_case() {
        assert!(is_lowercase("abc 123"));
        assert!(!is_lowercase("aBc"));
        assert!(is_uppercase("ABC 123"));
        assert!(!is_uppercase("AbC"));
    }
}
