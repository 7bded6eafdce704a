//! # Validation Options
//!
//! Per-call options, loadable from JSON or YAML. A schema node may carry
//! partial overrides ([`SchemaSettings`]) that apply to it and cascade to its
//! descendants for the remainder of the walk.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::LoadError;

/// Whether a value must, may, or must not be present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    /// Absent values pass.
    #[default]
    Optional,
    /// Absent values fail with `any.required`.
    Required,
    /// Present values fail with `any.unknown`.
    Forbidden,
}

/// Options of a single `validate` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationOptions {
    /// Stop at the first failure anywhere in the tree.
    pub abort_early: bool,
    /// Apply coercions and transforms before testing.
    pub convert: bool,
    /// Accept object keys that no child schema declares.
    pub allow_unknown: bool,
    /// Presence applied to nodes that set none.
    pub presence: Presence,
    /// Values reachable through context references (`$key`).
    pub context: Map<String, Value>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            abort_early: true,
            convert: true,
            allow_unknown: false,
            presence: Presence::Optional,
            context: Map::new(),
        }
    }
}

impl ValidationOptions {
    /// Parse camelCase JSON; missing fields take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse camelCase YAML; missing fields take their defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, LoadError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Replace the context map read by `$` references.
    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = context;
        self
    }

    /// Set whether the first failure ends the walk.
    pub fn abort_early(mut self, abort_early: bool) -> Self {
        self.abort_early = abort_early;
        self
    }

    /// Set whether conversions run before tests.
    pub fn convert(mut self, convert: bool) -> Self {
        self.convert = convert;
        self
    }

    /// These options with `settings` layered on top.
    pub fn merged(&self, settings: &SchemaSettings) -> Self {
        let mut merged = self.clone();
        if let Some(abort_early) = settings.abort_early {
            merged.abort_early = abort_early;
        }
        if let Some(convert) = settings.convert {
            merged.convert = convert;
        }
        if let Some(allow_unknown) = settings.allow_unknown {
            merged.allow_unknown = allow_unknown;
        }
        if let Some(presence) = settings.presence {
            merged.presence = presence;
        }
        if let Some(context) = &settings.context {
            for (key, value) in context {
                merged.context.insert(key.clone(), value.clone());
            }
        }
        merged
    }
}

/// Partial options attached to a schema node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchemaSettings {
    /// Overrides [`ValidationOptions::abort_early`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abort_early: Option<bool>,
    /// Overrides [`ValidationOptions::convert`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub convert: Option<bool>,
    /// Overrides [`ValidationOptions::allow_unknown`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_unknown: Option<bool>,
    /// Overrides [`ValidationOptions::presence`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence: Option<Presence>,
    /// Entries merged over the caller's context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Map<String, Value>>,
}

impl SchemaSettings {
    /// Layer `other` on top of `self`; fields set in `other` win.
    pub fn merge(&mut self, other: &SchemaSettings) {
        if other.abort_early.is_some() {
            self.abort_early = other.abort_early;
        }
        if other.convert.is_some() {
            self.convert = other.convert;
        }
        if other.allow_unknown.is_some() {
            self.allow_unknown = other.allow_unknown;
        }
        if other.presence.is_some() {
            self.presence = other.presence;
        }
        if let Some(context) = &other.context {
            let target = self.context.get_or_insert_with(Map::new);
            for (key, value) in context {
                target.insert(key.clone(), value.clone());
            }
        }
    }

    /// True when nothing is overridden.
    pub fn is_empty(&self) -> bool {
        self == &SchemaSettings::default()
    }
}
