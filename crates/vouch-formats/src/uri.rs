//! # URI Matching
//!
//! Absolute URIs per RFC 3986, optionally admitting relative references and
//! optionally restricting the scheme to an alternation of literal names and
//! patterns.

use regex::Regex;
use serde_json::{json, Map, Value};
use vouch_core::ConfigError;

use crate::pattern::{self, Pattern, PatternDescription};
use crate::rfc3986;

/// Characters escaped when a literal scheme is shown in a message.
const DISPLAY_ESCAPED: &str = "^$.*+-?=!:|\\/()[]{},";

/// One allowed scheme.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemeSpec {
    /// Matched verbatim.
    Literal(String),
    /// Matched by pattern source; flags are ignored.
    Pattern(Pattern),
}

impl SchemeSpec {
    fn matcher_source(&self) -> String {
        match self {
            Self::Literal(name) => regex::escape(name),
            Self::Pattern(p) => pattern::translate(p.source()),
        }
    }

    fn display(&self) -> String {
        match self {
            Self::Literal(name) => {
                let mut out = String::with_capacity(name.len());
                for c in name.chars() {
                    if DISPLAY_ESCAPED.contains(c) {
                        out.push('\\');
                    }
                    out.push(c);
                }
                out
            }
            Self::Pattern(p) => p.source().to_string(),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Self::Literal(name) => json!(name),
            Self::Pattern(p) => json!(p.describe()),
        }
    }
}

impl From<&str> for SchemeSpec {
    fn from(name: &str) -> Self {
        Self::Literal(name.to_string())
    }
}

impl From<Pattern> for SchemeSpec {
    fn from(pattern: Pattern) -> Self {
        Self::Pattern(pattern)
    }
}

/// Options of the `uri` rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UriOptions {
    /// Allowed schemes; `None` allows any RFC 3986 scheme.
    pub scheme: Option<Vec<SchemeSpec>>,
    /// Also accept relative references.
    pub allow_relative: bool,
}

impl UriOptions {
    pub fn scheme<I, S>(mut self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SchemeSpec>,
    {
        self.scheme = Some(schemes.into_iter().map(Into::into).collect());
        self
    }

    pub fn allow_relative(mut self, allow: bool) -> Self {
        self.allow_relative = allow;
        self
    }

    /// Reject schemes that can never match.
    pub fn check(&self) -> Result<(), ConfigError> {
        let Some(schemes) = &self.scheme else {
            return Ok(());
        };
        if schemes.is_empty() {
            return Err(ConfigError::SchemeEmpty);
        }
        for (position, scheme) in schemes.iter().enumerate() {
            if let SchemeSpec::Literal(name) = scheme {
                if !name.chars().any(|c| c.is_ascii_alphabetic()) {
                    return Err(ConfigError::SchemeInvalid { position });
                }
            }
        }
        Ok(())
    }

    /// Parse the plain-data form. A pattern is an object with a `source`.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let options = value.as_object().ok_or(ConfigError::OptionsShape)?;
        let mut parsed = Self {
            allow_relative: options
                .get("allowRelative")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            ..Self::default()
        };

        match options.get("scheme") {
            None | Some(Value::Null) => {}
            Some(Value::Array(entries)) => {
                let mut schemes = Vec::with_capacity(entries.len());
                for (position, entry) in entries.iter().enumerate() {
                    let scheme = scheme_entry(entry)?
                        .ok_or(ConfigError::SchemeEntryShape { position })?;
                    schemes.push(scheme);
                }
                parsed.scheme = Some(schemes);
            }
            Some(single) => {
                let scheme = scheme_entry(single)?.ok_or(ConfigError::SchemeShape)?;
                parsed.scheme = Some(vec![scheme]);
            }
        }

        parsed.check()?;
        Ok(parsed)
    }

    pub fn to_value(&self) -> Value {
        let mut options = Map::new();
        if let Some(schemes) = &self.scheme {
            let entries: Vec<Value> = schemes.iter().map(SchemeSpec::to_value).collect();
            options.insert("scheme".into(), Value::Array(entries));
        }
        if self.allow_relative {
            options.insert("allowRelative".into(), json!(true));
        }
        Value::Object(options)
    }
}

/// `Ok(None)` when the entry has neither supported shape.
fn scheme_entry(entry: &Value) -> Result<Option<SchemeSpec>, ConfigError> {
    match entry {
        Value::String(name) => Ok(Some(SchemeSpec::Literal(name.clone()))),
        Value::Object(map) if map.contains_key("source") => {
            let description: PatternDescription = serde_json::from_value(entry.clone())
                .map_err(|e| ConfigError::MalformedDescription(e.to_string()))?;
            Ok(Some(SchemeSpec::Pattern(Pattern::from_description(&description)?)))
        }
        _ => Ok(None),
    }
}

/// Compiled matcher for one [`UriOptions`].
#[derive(Debug, Clone)]
pub struct UriMatcher {
    options: UriOptions,
    regex: Regex,
    scheme_display: Option<String>,
}

impl UriMatcher {
    pub fn new(options: UriOptions) -> Result<Self, ConfigError> {
        options.check()?;
        let (scheme, scheme_display) = match &options.scheme {
            Some(schemes) => {
                let sources: Vec<String> = schemes.iter().map(SchemeSpec::matcher_source).collect();
                let display: Vec<String> = schemes.iter().map(SchemeSpec::display).collect();
                (format!("(?:{})", sources.join("|")), Some(display.join("|")))
            }
            None => (rfc3986::scheme(), None),
        };

        let absolute = format!("(?:{scheme}:{})", rfc3986::hier_part());
        let reference = if options.allow_relative {
            format!("(?:{absolute}|{})", rfc3986::relative_ref())
        } else {
            absolute
        };
        let source = format!(
            "^{reference}(?:\\?{})?(?:#{})?$",
            rfc3986::query(),
            rfc3986::fragment()
        );
        let regex = Regex::new(&source).map_err(|e| ConfigError::InvalidPattern {
            pattern: scheme.clone(),
            flags: String::new(),
            reason: e.to_string(),
        })?;
        tracing::debug!(
            scheme = scheme_display.as_deref().unwrap_or("*"),
            allow_relative = options.allow_relative,
            "compiled uri matcher"
        );
        Ok(Self {
            options,
            regex,
            scheme_display,
        })
    }

    pub fn options(&self) -> &UriOptions {
        &self.options
    }

    /// The scheme alternation as shown in messages, when restricted.
    pub fn scheme_display(&self) -> Option<&str> {
        self.scheme_display.as_deref()
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl PartialEq for UriMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.options == other.options
    }
}
