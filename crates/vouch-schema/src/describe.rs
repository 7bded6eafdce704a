//! # Describe and Build — Schemas as Plain Data
//!
//! [`describe`] turns a schema into a [`Description`]: plain, serializable
//! data with the node type, flags, option overrides, literal sets, tests as
//! `{name, args}`, replacements and children. [`Schema::build`] is its
//! inverse; each test name is looked up in the rule registry of the node
//! type and rebuilt from its arguments, with the same construction errors
//! the builder methods return.
//!
//! Descriptions load from JSON or YAML, either as text or from a file whose
//! extension selects the format.
//!
//! ## Round trip
//!
//! `Schema::build(&describe(&s))` validates exactly like `s` and compares
//! equal to it. Regexes appear as `{source, flags}` and references as
//! `{"ref": "<raw>"}`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use vouch_core::{ConfigError, LoadError, SchemaSettings};
use vouch_formats::{Pattern, PatternDescription};

use crate::flags::Flags;
use crate::rules;
use crate::schema::{Child, Replacement, Schema, SchemaType};

/// Plain-data form of a schema node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Description {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(default, skip_serializing_if = "FlagsDescription::is_empty")]
    pub flags: FlagsDescription,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<SchemaSettings>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub valids: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invalids: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tests: Vec<TestDescription>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replacements: Vec<ReplacementDescription>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChildDescription>,
}

/// Flags as found in a description. Names the engine does not know are
/// kept apart so that building can report and skip them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlagsDescription {
    #[serde(flatten)]
    pub known: Flags,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

impl FlagsDescription {
    pub fn is_empty(&self) -> bool {
        self.known.is_empty() && self.unknown.is_empty()
    }
}

/// One test: its registry name and plain-data arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestDescription {
    pub name: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub args: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplacementDescription {
    pub pattern: PatternDescription,
    pub replacement: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildDescription {
    pub key: String,
    pub schema: Description,
}

impl Description {
    /// Parse a JSON description.
    pub fn from_json_str(text: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse a YAML description.
    pub fn from_yaml_str(text: &str) -> Result<Self, LoadError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load from a file; `.yaml` and `.yml` are YAML, anything else JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            _ => Self::from_json_str(&text),
        }
    }

    /// Shorthand for [`Schema::build`].
    pub fn build(&self) -> Result<Schema, ConfigError> {
        Schema::build(self)
    }
}

/// Describe `schema` as plain data.
pub fn describe(schema: &Schema) -> Description {
    let node = schema.node();
    Description {
        schema_type: node.schema_type,
        flags: FlagsDescription {
            known: node.flags.clone(),
            unknown: BTreeMap::new(),
        },
        options: node.settings.clone().filter(|settings| !settings.is_empty()),
        valids: node.valids.values().to_vec(),
        invalids: node.invalids.values().to_vec(),
        tests: node
            .tests
            .iter()
            .map(|rule| TestDescription {
                name: rule.name().to_string(),
                args: rule.args(),
            })
            .collect(),
        replacements: node
            .replacements
            .iter()
            .map(|replacement| ReplacementDescription {
                pattern: replacement.pattern.describe(),
                replacement: replacement.replacement.clone(),
            })
            .collect(),
        children: node
            .children
            .iter()
            .map(|child| ChildDescription {
                key: child.key.clone(),
                schema: describe(&child.schema),
            })
            .collect(),
    }
}

impl Schema {
    /// Rebuild a schema from its description.
    ///
    /// Literal sets are taken as given: a string description without
    /// `invalids` builds a node that accepts `""`.
    pub fn build(description: &Description) -> Result<Schema, ConfigError> {
        let schema_type = description.schema_type;
        if schema_type != SchemaType::Object && !description.children.is_empty() {
            return Err(ConfigError::MalformedDescription(format!(
                "{schema_type} schema cannot declare children"
            )));
        }

        let mut schema = Schema::new(schema_type);
        let node = schema.node_mut();
        for (flag, value) in &description.flags.unknown {
            warn!(%flag, %value, %schema_type, "ignoring unknown flag in description");
        }
        node.flags = description.flags.known.clone();
        node.settings = description.options.clone();
        node.valids = description.valids.iter().cloned().collect();
        node.invalids = description.invalids.iter().cloned().collect();

        for test in &description.tests {
            let factory = rules::lookup(schema_type, &test.name)?;
            node.tests.push(factory(&test.args)?);
        }
        for replacement in &description.replacements {
            node.replacements.push(Replacement {
                pattern: Pattern::from_description(&replacement.pattern)?,
                replacement: replacement.replacement.clone(),
            });
        }
        for child in &description.children {
            node.children.push(Child {
                key: child.key.clone(),
                schema: Schema::build(&child.schema)?,
            });
        }

        debug!(
            %schema_type,
            tests = node.tests.len(),
            children = node.children.len(),
            "built schema from description"
        );
        Ok(schema)
    }

    /// Load and build a description file.
    pub fn load(path: impl AsRef<Path>) -> Result<Schema, LoadError> {
        Ok(Description::from_path(path)?.build()?)
    }
}
