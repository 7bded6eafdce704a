//! # Patterns — Regular Expressions with Source and Flags
//!
//! A [`Pattern`] keeps the source text and flag letters it was written with
//! next to the compiled [`Regex`], so it can be described, compared and
//! rebuilt without loss. Flags are the letters `g`, `i`, `m`, `s`, `u`, `y`:
//!
//! - `i`, `m`, `s` map onto the matching [`RegexBuilder`] switches.
//! - `g` selects replace-all in [`Pattern::replace`].
//! - `u` and `y` are accepted and recorded; matching is always Unicode aware.
//!
//! The character-class escapes keep their ECMAScript meaning: `\d` and `\w`
//! are ASCII only, `\s` is the ECMAScript whitespace set, and `\b` is an
//! ASCII word boundary (`[\b]` is a backspace). `\B` stays Unicode aware.
//!
//! Replacements follow `String.prototype.replace`: `$$`, `$&`, `` $` ``, `$'`,
//! `$n`, `$nn` and, when the pattern names a group, `$<name>`. Anything else
//! after a `$` is kept literally.
//!
//! A brace that does not start a `{n}`, `{n,}` or `{n,m}` quantifier is taken
//! literally, as is a `[` inside a character class.

use std::fmt;

use regex::{Captures, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use vouch_core::ConfigError;

/// Flag letters a pattern may carry.
pub const FLAGS: &str = "gimsuy";

/// Plain-data form of a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDescription {
    pub source: String,
    #[serde(default)]
    pub flags: String,
}

/// A compiled regular expression that remembers how it was written.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    flags: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `source` with the flag letters in `flags`.
    pub fn new(source: &str, flags: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidPattern {
            pattern: source.to_string(),
            flags: flags.to_string(),
            reason,
        };
        for (index, flag) in flags.char_indices() {
            if !FLAGS.contains(flag) {
                return Err(invalid(format!("unsupported flag '{flag}'")));
            }
            if flags[..index].contains(flag) {
                return Err(invalid(format!("duplicate flag '{flag}'")));
            }
        }
        let regex = RegexBuilder::new(&translate(source))
            .case_insensitive(flags.contains('i'))
            .multi_line(flags.contains('m'))
            .dot_matches_new_line(flags.contains('s'))
            .build()
            .map_err(|e| invalid(e.to_string()))?;
        Ok(Self {
            source: source.to_string(),
            flags: flags.to_string(),
            regex,
        })
    }

    /// A global pattern matching `text` literally.
    pub fn literal(text: &str) -> Result<Self, ConfigError> {
        Self::new(&regex::escape(text), "g")
    }

    /// Rebuild from the plain-data form.
    pub fn from_description(description: &PatternDescription) -> Result<Self, ConfigError> {
        Self::new(&description.source, &description.flags)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    pub fn is_global(&self) -> bool {
        self.flags.contains('g')
    }

    /// This pattern with only the flags in `keep` retained.
    pub fn retain_flags(&self, keep: &str) -> Result<Self, ConfigError> {
        let flags: String = self.flags.chars().filter(|f| keep.contains(*f)).collect();
        if flags == self.flags {
            return Ok(self.clone());
        }
        Self::new(&self.source, &flags)
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    /// Replace the first match, or every match when the pattern is global.
    pub fn replace(&self, value: &str, replacement: &str) -> String {
        let limit = if self.is_global() { 0 } else { 1 };
        self.regex
            .replacen(value, limit, |caps: &Captures<'_>| {
                let mut out = String::new();
                self.expand(replacement, value, caps, &mut out);
                out
            })
            .into_owned()
    }

    /// Append `template` to `dst` with its `$` forms substituted for one match.
    fn expand(&self, template: &str, haystack: &str, caps: &Captures<'_>, dst: &mut String) {
        let Some(whole) = caps.get(0) else {
            return;
        };
        let groups = self.regex.captures_len() - 1;
        let named = self.regex.capture_names().any(|name| name.is_some());
        let mut rest = template;
        while let Some(at) = rest.find('$') {
            dst.push_str(&rest[..at]);
            let tail = &rest[at + 1..];
            let consumed = match tail.as_bytes().first() {
                Some(b'$') => {
                    dst.push('$');
                    1
                }
                Some(b'&') => {
                    dst.push_str(whole.as_str());
                    1
                }
                Some(b'`') => {
                    dst.push_str(&haystack[..whole.start()]);
                    1
                }
                Some(b'\'') => {
                    dst.push_str(&haystack[whole.end()..]);
                    1
                }
                Some(b'<') if named => match tail.find('>') {
                    Some(close) => {
                        if let Some(group) = caps.name(&tail[1..close]) {
                            dst.push_str(group.as_str());
                        }
                        close + 1
                    }
                    None => {
                        dst.push('$');
                        0
                    }
                },
                _ => match group_reference(tail, groups) {
                    Some((index, len)) => {
                        if let Some(group) = caps.get(index) {
                            dst.push_str(group.as_str());
                        }
                        len
                    }
                    None => {
                        dst.push('$');
                        0
                    }
                },
            };
            rest = &tail[consumed..];
        }
        dst.push_str(rest);
    }

    pub fn describe(&self) -> PatternDescription {
        PatternDescription {
            source: self.source.clone(),
            flags: self.flags.clone(),
        }
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.flags == other.flags
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}

/// Group index and digits consumed for a `$n` or `$nn` reference.
///
/// Two digits win when they name an existing group; `$0` is not a reference.
fn group_reference(tail: &str, groups: usize) -> Option<(usize, usize)> {
    let digit = |b: &u8| b.is_ascii_digit().then(|| usize::from(b - b'0'));
    let bytes = tail.as_bytes();
    let first = bytes.first().and_then(digit)?;
    if let Some(second) = bytes.get(1).and_then(digit) {
        let index = first * 10 + second;
        if (1..=groups).contains(&index) {
            return Some((index, 2));
        }
    }
    (1..=groups).contains(&first).then_some((first, 1))
}

const DIGIT: &str = "0-9";
const WORD: &str = "0-9A-Za-z_";
/// WhiteSpace and LineTerminator code points.
const SPACE: &str = "\\t\\n\\x0B\\x0C\\r \\x{A0}\\x{1680}\\x{2000}-\\x{200A}\\x{2028}\\x{2029}\\x{202F}\\x{205F}\\x{3000}\\x{FEFF}";

/// The `regex` form of the escape `\letter`.
fn escape(letter: char, in_class: bool) -> String {
    // Nested inside a class too, so `[\w-.]` never reads as a range.
    let class = |members: &str, negated: bool| {
        let caret = if negated { "^" } else { "" };
        format!("[{caret}{members}]")
    };
    match letter {
        'd' => class(DIGIT, false),
        'D' => class(DIGIT, true),
        'w' => class(WORD, false),
        'W' => class(WORD, true),
        's' => class(SPACE, false),
        'S' => class(SPACE, true),
        'b' if in_class => "\\x08".to_string(),
        'B' if in_class => "B".to_string(),
        'b' => "(?-u:\\b)".to_string(),
        // `(?-u:\B)` can match inside a UTF-8 sequence and does not compile.
        'B' => "\\B".to_string(),
        '0' => "\\x00".to_string(),
        other => format!("\\{other}"),
    }
}

/// Rewrite `source` into `regex` syntax: ECMAScript escapes, literal braces
/// and nested brackets.
pub(crate) fn translate(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len() + 8);
    let mut in_class = false;
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        match ch {
            '\\' => match chars.get(i + 1) {
                Some(next) => {
                    out.push_str(&escape(*next, in_class));
                    i += 1;
                }
                None => out.push(ch),
            },
            '[' if in_class => out.push_str("\\["),
            '&' | '~' if in_class => {
                out.push('\\');
                out.push(ch);
            }
            '[' => {
                in_class = true;
                out.push(ch);
                if chars.get(i + 1) == Some(&'^') {
                    out.push('^');
                    i += 1;
                }
                // A leading `]` is a literal member.
                if chars.get(i + 1) == Some(&']') {
                    out.push_str("\\]");
                    i += 1;
                }
            }
            ']' if in_class => {
                in_class = false;
                out.push(ch);
            }
            '{' if !in_class => match quantifier_end(&chars, i) {
                Some(end) => {
                    out.extend(&chars[i..=end]);
                    i = end;
                }
                None => out.push_str("\\{"),
            },
            '}' if !in_class => out.push_str("\\}"),
            _ => out.push(ch),
        }
        i += 1;
    }
    out
}

/// Index of the closing brace when `chars[start]` opens a quantifier.
fn quantifier_end(chars: &[char], start: usize) -> Option<usize> {
    let mut i = start + 1;
    let digits = |i: &mut usize| {
        let from = *i;
        while chars.get(*i).is_some_and(char::is_ascii_digit) {
            *i += 1;
        }
        *i > from
    };
    if !digits(&mut i) {
        return None;
    }
    if chars.get(i) == Some(&',') {
        i += 1;
        digits(&mut i);
    }
    (chars.get(i) == Some(&'}')).then_some(i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_map_to_builder() {
        let pattern = Pattern::new("^abc$", "i").unwrap();
        assert!(pattern.is_match("ABC"));
        assert_eq!(pattern.to_string(), "/^abc$/i");
    }

    #[test]
    fn test_rejects_bad_flags() {
        assert!(Pattern::new("a", "x").is_err());
        assert!(Pattern::new("a", "gg").is_err());
        assert!(Pattern::new("(", "").is_err());
    }

    #[test]
    fn test_literal_braces_compile() {
        let pattern = Pattern::new("^{7e908", "").unwrap();
        assert!(pattern.is_match("{7e908"));
        let quantified = Pattern::new("^a{2}$", "").unwrap();
        assert!(quantified.is_match("aa"));
        assert!(!quantified.is_match("a"));
        let open = Pattern::new("a{2,}", "").unwrap();
        assert!(open.is_match("aaa"));
        let unmatched = Pattern::new("x}", "").unwrap();
        assert!(unmatched.is_match("x}"));
    }

    #[test]
    fn test_brackets_inside_class() {
        let pattern = Pattern::new("^[[a]+$", "").unwrap();
        assert!(pattern.is_match("[a["));
        let escaped = Pattern::new("[\\]]", "").unwrap();
        assert!(escaped.is_match("]"));
    }

    #[test]
    fn test_replace_global_and_first() {
        let global = Pattern::new("a", "g").unwrap();
        assert_eq!(global.replace("aaa", "b"), "bbb");
        let first = Pattern::new("a", "").unwrap();
        assert_eq!(first.replace("aaa", "b"), "baa");
        let groups = Pattern::new("(\\w+) (\\w+)", "").unwrap();
        assert_eq!(groups.replace("hello world", "$2 $1"), "world hello");
    }

    #[test]
    fn test_replacement_templates() {
        let pair = Pattern::new("(\\w)(\\d)", "").unwrap();
        assert_eq!(pair.replace("a1", "$1x"), "ax");
        assert_eq!(pair.replace("a1", "$2$1"), "1a");
        assert_eq!(pair.replace("-a1-", "[$&]"), "-[a1]-");
        assert_eq!(pair.replace("-a1+", "$`|$'"), "--|++");
        assert_eq!(pair.replace("a1", "$$1"), "$1");
        assert_eq!(pair.replace("a1", "$0$3$"), "$0$3$");

        let one = Pattern::new("(a)", "g").unwrap();
        assert_eq!(one.replace("aa", "$10"), "a0a0");
        assert_eq!(one.replace("aa", "$01"), "aa");
        assert_eq!(one.replace("a", "$<x>"), "$<x>");

        let named = Pattern::new("(?<w>b)(?<z>y)?", "").unwrap();
        assert_eq!(named.replace("abc", "[$<w>]"), "a[b]c");
        assert_eq!(named.replace("abc", "[$<z>$<nope>]"), "a[]c");
        assert_eq!(named.replace("abc", "$<w"), "a$<wc");
    }

    #[test]
    fn test_class_escapes_are_ascii() {
        let digits = Pattern::new("^\\d$", "").unwrap();
        assert!(digits.is_match("3"));
        assert!(!digits.is_match("\u{663}"));
        assert!(Pattern::new("^\\D$", "").unwrap().is_match("\u{663}"));
        assert!(!Pattern::new("\\w", "").unwrap().is_match("\u{e9}"));
        assert!(Pattern::new("^\\W$", "").unwrap().is_match("\u{e9}"));

        let mixed = Pattern::new("^[\\dx]+$", "").unwrap();
        assert!(mixed.is_match("1x2"));
        assert!(!mixed.is_match("1\u{663}"));
        let dashed = Pattern::new("^[\\w-.]+$", "").unwrap();
        assert!(dashed.is_match("a-b.c_d"));
        assert!(!dashed.is_match("a/b"));
        assert!(Pattern::new("^[^\\d]$", "").unwrap().is_match("\u{663}"));
    }

    #[test]
    fn test_space_and_boundary_escapes() {
        let space = Pattern::new("^\\s$", "").unwrap();
        assert!(space.is_match("\u{feff}"));
        assert!(space.is_match("\u{a0}"));
        assert!(!space.is_match("\u{85}"));

        let boundary = Pattern::new("\\bfoo", "").unwrap();
        assert!(boundary.is_match("\u{e9}foo"));
        assert!(!boundary.is_match("xfoo"));
        assert!(Pattern::new("^[\\b]$", "").unwrap().is_match("\u{8}"));
        assert!(Pattern::new("^a\\0$", "").unwrap().is_match("a\0"));
    }

    #[test]
    fn test_literal_escapes_metacharacters() {
        let pattern = Pattern::literal("a.b").unwrap();
        assert_eq!(pattern.replace("a.b axb a.b", "-"), "- axb -");
    }

    #[test]
    fn test_retain_flags_and_equality() {
        let pattern = Pattern::new("a", "gi").unwrap();
        let normalized = pattern.retain_flags("i").unwrap();
        assert_eq!(normalized.flags(), "i");
        assert_eq!(normalized, Pattern::new("a", "i").unwrap());
        assert_ne!(normalized, pattern);
        let rebuilt = Pattern::from_description(&normalized.describe()).unwrap();
        assert_eq!(rebuilt, normalized);
    }
}
