//! # Schema Flags
//!
//! Named settings of a schema node that are not tests: presence, literal
//! restriction, case handling, trimming, truncation, label and default.
//! Only flags that differ from their default are serialized, so a plain
//! `string()` describes with no `flags` at all.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use vouch_core::Presence;

/// Case folding applied before tests when converting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Case {
    Lower,
    Upper,
}

/// Node flags. Every field defaults to "not set".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flags {
    /// Presence for this node; inherited from the options when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence: Option<Presence>,

    /// Only members of `valids` are accepted.
    #[serde(default, skip_serializing_if = "is_false")]
    pub allow_only: bool,

    /// Literal sets compare strings case-insensitively.
    #[serde(default, skip_serializing_if = "is_false")]
    pub insensitive: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case: Option<Case>,

    /// Strip leading and trailing whitespace when converting.
    #[serde(default, skip_serializing_if = "is_false")]
    pub trim: bool,

    /// Tri-state: unset, explicitly on, explicitly off.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncate: Option<bool>,

    /// Replaces the key in messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Substituted for an absent value. `Some(Value::Null)` is a null default.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,
}

impl Flags {
    pub fn is_empty(&self) -> bool {
        self == &Flags::default()
    }

    pub fn truncates(&self) -> bool {
        self.truncate == Some(true)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A present key always yields `Some`, even when its value is `null`.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_flags_serialize_empty() {
        assert_eq!(serde_json::to_value(Flags::default()).unwrap(), json!({}));
        assert!(Flags::default().is_empty());
    }

    #[test]
    fn test_truncate_is_tri_state() {
        let off = Flags {
            truncate: Some(false),
            ..Flags::default()
        };
        assert_eq!(serde_json::to_value(&off).unwrap(), json!({"truncate": false}));
        assert!(!off.truncates());
        assert!(!off.is_empty());
    }

    #[test]
    fn test_null_default_survives_round_trip() {
        let flags: Flags = serde_json::from_value(json!({"default": null})).unwrap();
        assert_eq!(flags.default, Some(Value::Null));
        assert_eq!(serde_json::to_value(&flags).unwrap(), json!({"default": null}));
    }

    #[test]
    fn test_camel_case_names() {
        let flags: Flags = serde_json::from_value(json!({
            "allowOnly": true,
            "presence": "required",
            "case": "upper"
        }))
        .unwrap();
        assert!(flags.allow_only);
        assert_eq!(flags.presence, Some(Presence::Required));
        assert_eq!(flags.case, Some(Case::Upper));
    }
}
