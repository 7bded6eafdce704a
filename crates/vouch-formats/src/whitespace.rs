//! Whitespace as defined for ECMAScript `String.prototype.trim`.

/// True for the characters `trim` strips: the ASCII controls `\t` to `\r`,
/// space, and the Unicode space separators plus line/paragraph separators
/// and the byte-order mark.
pub fn is_whitespace(ch: char) -> bool {
    matches!(
        ch,
        '\u{9}'..='\u{d}'
            | ' '
            | '\u{a0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200a}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202f}'
            | '\u{205f}'
            | '\u{3000}'
            | '\u{feff}'
    )
}

/// Strip leading and trailing whitespace.
pub fn trim(value: &str) -> &str {
    value.trim_matches(is_whitespace)
}

/// True when `value` has no leading or trailing whitespace.
pub fn is_trimmed(value: &str) -> bool {
    trim(value).len() == value.len()
}
