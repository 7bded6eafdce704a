//! # Length Measurement and Truncation
//!
//! Without an encoding, string length is the number of Unicode scalar values.
//! With one, it is the number of bytes the string occupies in that encoding,
//! computed the way a Node.js `Buffer.byteLength` would.
//!
//! Truncation keeps the longest prefix of whole characters whose measured
//! length does not exceed the limit.

use std::fmt;

use vouch_core::ConfigError;

/// Byte-length encodings accepted by the length tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Utf8,
    Ucs2,
    Utf16le,
    Latin1,
    Binary,
    Ascii,
    Base64,
    Hex,
}

impl Encoding {
    /// Parse an encoding name. Matching is case-insensitive and accepts the
    /// dashed aliases (`utf-8`, `ucs-2`, `utf-16le`).
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        let encoding = match name.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Self::Utf8,
            "ucs2" | "ucs-2" => Self::Ucs2,
            "utf16le" | "utf-16le" => Self::Utf16le,
            "latin1" => Self::Latin1,
            "binary" => Self::Binary,
            "ascii" => Self::Ascii,
            "base64" => Self::Base64,
            "hex" => Self::Hex,
            _ => return Err(ConfigError::InvalidEncoding(name.to_string())),
        };
        Ok(encoding)
    }

    /// Canonical name, as it appears in descriptions and failure context.
    pub fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "utf8",
            Self::Ucs2 => "ucs2",
            Self::Utf16le => "utf16le",
            Self::Latin1 => "latin1",
            Self::Binary => "binary",
            Self::Ascii => "ascii",
            Self::Base64 => "base64",
            Self::Hex => "hex",
        }
    }

    /// Number of bytes `value` occupies in this encoding.
    pub fn byte_length(self, value: &str) -> usize {
        let units = utf16_len(value);
        match self {
            Self::Utf8 => value.len(),
            Self::Ucs2 | Self::Utf16le => units * 2,
            Self::Latin1 | Self::Binary | Self::Ascii => units,
            Self::Hex => units >> 1,
            Self::Base64 => {
                let padding = value.chars().rev().take(2).take_while(|c| *c == '=').count();
                (units - padding) * 3 >> 2
            }
        }
    }

    /// True when the measured length is not monotone in the prefix length.
    fn is_block_based(self) -> bool {
        matches!(self, Self::Hex | Self::Base64)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn utf16_len(value: &str) -> usize {
    value.chars().map(char::len_utf16).sum()
}

/// Length of `value` in characters, or in bytes of `encoding`.
pub fn measure(value: &str, encoding: Option<Encoding>) -> usize {
    match encoding {
        Some(encoding) => encoding.byte_length(value),
        None => value.chars().count(),
    }
}

/// Longest whole-character prefix of `value` measuring at most `limit`.
pub fn truncate(value: &str, limit: usize, encoding: Option<Encoding>) -> &str {
    if measure(value, encoding) <= limit {
        return value;
    }
    match encoding {
        None => match value.char_indices().nth(limit) {
            Some((end, _)) => &value[..end],
            None => value,
        },
        Some(encoding) if encoding.is_block_based() => {
            let mut best = 0;
            for (end, ch) in value.char_indices() {
                let next = end + ch.len_utf8();
                if encoding.byte_length(&value[..next]) <= limit {
                    best = next;
                }
            }
            &value[..best]
        }
        Some(encoding) => {
            let mut end = 0;
            for (start, ch) in value.char_indices() {
                let next = start + ch.len_utf8();
                if encoding.byte_length(&value[..next]) > limit {
                    break;
                }
                end = next;
            }
            &value[..end]
        }
    }
}
