//! # References — Late-Bound Pointers to Sibling or Context Values
//!
//! A reference names a value that is only known at validation time. Two
//! resolution classes exist:
//!
//! - **Sibling** (`a`, `a.b`): looked up in the object that encloses the
//!   field currently being validated.
//! - **Context** (`$a`, `$a.b`): looked up in the caller-supplied context
//!   map, independent of nesting depth.
//!
//! Paths are dot-separated. A numeric segment indexes into an array.
//! References are never cached; each validation call resolves them anew.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ConfigError, ReferenceError};

/// Prefix marking a context reference.
pub const CONTEXT_PREFIX: char = '$';

/// Path separator inside a reference key.
pub const SEPARATOR: char = '.';

/// Where a reference is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// Resolved against the enclosing object.
    Sibling,
    /// Resolved against the caller-supplied context map.
    Context,
}

/// A symbolic pointer to another value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Reference {
    kind: ReferenceKind,
    key: String,
    path: Vec<String>,
}

impl Reference {
    /// Parse `a.b` (sibling) or `$a.b` (context).
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let (kind, key) = match raw.strip_prefix(CONTEXT_PREFIX) {
            Some(rest) => (ReferenceKind::Context, rest),
            None => (ReferenceKind::Sibling, raw),
        };
        if key.is_empty() {
            return Err(ConfigError::InvalidReference(raw.to_string()));
        }
        Ok(Self {
            kind,
            key: key.to_string(),
            path: key.split(SEPARATOR).map(str::to_string).collect(),
        })
    }

    /// Sibling reference shorthand.
    pub fn sibling(key: &str) -> Result<Self, ConfigError> {
        Self::parse(key)
    }

    /// Context reference shorthand; `key` carries no prefix.
    pub fn context(key: &str) -> Result<Self, ConfigError> {
        Self::parse(&format!("{CONTEXT_PREFIX}{key}"))
    }

    /// Sibling or context.
    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    /// The key without the context prefix, as shown in error messages.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The key split on `.`.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// The reference in its parseable form.
    pub fn raw(&self) -> String {
        match self.kind {
            ReferenceKind::Sibling => self.key.clone(),
            ReferenceKind::Context => format!("{CONTEXT_PREFIX}{}", self.key),
        }
    }

    /// Follow the path from the appropriate root.
    ///
    /// `parent` is the object enclosing the field under validation, absent at
    /// the document root.
    pub fn resolve<'v>(
        &self,
        parent: Option<&'v Map<String, Value>>,
        context: &'v Map<String, Value>,
    ) -> Result<&'v Value, ReferenceError> {
        let root = match self.kind {
            ReferenceKind::Sibling => parent,
            ReferenceKind::Context => Some(context),
        };
        let missing = || ReferenceError::Missing {
            key: self.key.clone(),
        };
        let root = root.ok_or_else(missing)?;

        let (first, rest) = self.path.split_first().ok_or_else(missing)?;
        let mut current = root.get(first).ok_or_else(missing)?;
        for segment in rest {
            current = match current {
                Value::Object(map) => map.get(segment).ok_or_else(missing)?,
                Value::Array(items) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| items.get(index))
                    .ok_or_else(missing)?,
                _ => {
                    return Err(ReferenceError::Invalid {
                        key: self.key.clone(),
                        segment: segment.clone(),
                    })
                }
            };
        }
        tracing::trace!(reference = %self, "resolved reference");
        Ok(current)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ReferenceKind::Sibling => write!(f, "ref:{}", self.key),
            ReferenceKind::Context => write!(f, "context:{}", self.key),
        }
    }
}

impl TryFrom<String> for Reference {
    type Error = ConfigError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<Reference> for String {
    fn from(reference: Reference) -> Self {
        reference.raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_parse_sibling_and_context() {
        let sibling = Reference::parse("a.b").unwrap();
        assert_eq!(sibling.kind(), ReferenceKind::Sibling);
        assert_eq!(sibling.path(), ["a", "b"]);
        assert_eq!(sibling.to_string(), "ref:a.b");

        let context = Reference::parse("$a").unwrap();
        assert_eq!(context.kind(), ReferenceKind::Context);
        assert_eq!(context.key(), "a");
        assert_eq!(context.raw(), "$a");
        assert_eq!(context.to_string(), "context:a");
    }

    #[test]
    fn test_parse_rejects_empty_key() {
        assert!(Reference::parse("").is_err());
        assert!(Reference::parse("$").is_err());
    }

    #[test]
    fn test_resolve_sibling() {
        let parent = object(json!({"a": 2, "nested": {"b": "x"}}));
        let context = Map::new();
        let a = Reference::parse("a").unwrap();
        assert_eq!(a.resolve(Some(&parent), &context).unwrap(), &json!(2));
        let b = Reference::parse("nested.b").unwrap();
        assert_eq!(b.resolve(Some(&parent), &context).unwrap(), &json!("x"));
    }

    #[test]
    fn test_resolve_context_ignores_parent() {
        let parent = object(json!({"a": 1}));
        let context = object(json!({"a": 5}));
        let r = Reference::parse("$a").unwrap();
        assert_eq!(r.resolve(Some(&parent), &context).unwrap(), &json!(5));
    }

    #[test]
    fn test_resolve_array_index() {
        let context = object(json!({"list": [10, 20]}));
        let r = Reference::parse("$list.1").unwrap();
        assert_eq!(r.resolve(None, &context).unwrap(), &json!(20));
    }

    #[test]
    fn test_resolve_missing_and_invalid() {
        let parent = object(json!({"a": "text"}));
        let context = Map::new();
        let missing = Reference::parse("b").unwrap();
        assert!(matches!(
            missing.resolve(Some(&parent), &context),
            Err(ReferenceError::Missing { .. })
        ));
        let invalid = Reference::parse("a.b").unwrap();
        assert!(matches!(
            invalid.resolve(Some(&parent), &context),
            Err(ReferenceError::Invalid { .. })
        ));
        let rootless = Reference::parse("a").unwrap();
        assert!(rootless.resolve(None, &context).is_err());
    }

    #[test]
    fn test_serde_uses_raw_form() {
        let r = Reference::parse("$a.b").unwrap();
        let encoded = serde_json::to_value(&r).unwrap();
        assert_eq!(encoded, json!("$a.b"));
        let decoded: Reference = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, r);
    }
}
