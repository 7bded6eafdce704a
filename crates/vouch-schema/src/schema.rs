//! # Schema Nodes and the Builder Chain
//!
//! A [`Schema`] is a cheap handle to an immutable [`SchemaNode`]. Builder
//! methods take the handle by value and return a new one; the node is copied
//! only when it is shared, so attaching a rule to a schema never changes a
//! schema built from it earlier.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use vouch_core::{LiteralSet, Presence, SchemaSettings, ValidationOptions};
use vouch_formats::Pattern;

use crate::describe::{self, Description};
use crate::engine::{self, ValidationResult};
use crate::flags::Flags;
use crate::rules::Rule;
use crate::string::StringSchema;

/// The type a node validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// Any present value.
    Any,
    String,
    /// A number, or a numeric string when converting.
    Number,
    /// An object with declared keys.
    Object,
}

impl SchemaType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::String => "string",
            Self::Number => "number",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A pattern replacement applied when converting strings.
#[derive(Debug, Clone, PartialEq)]
pub struct Replacement {
    pub pattern: Pattern,
    /// May reference `$1`, `$<name>`, `$&` and the other `String.prototype.replace` forms.
    pub replacement: String,
}

/// A declared key of an object schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Child {
    pub key: String,
    pub schema: Schema,
}

/// The data behind a [`Schema`]. Read-only once reachable from a handle.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub schema_type: SchemaType,
    pub flags: Flags,
    /// Option overrides for this node and its descendants.
    pub settings: Option<SchemaSettings>,
    pub valids: LiteralSet,
    pub invalids: LiteralSet,
    /// Constraint tests in registration order.
    pub tests: Vec<Rule>,
    /// Applied in definition order.
    pub replacements: Vec<Replacement>,
    /// Declared keys in declaration order; objects only.
    pub children: Vec<Child>,
}

impl SchemaNode {
    fn new(schema_type: SchemaType) -> Self {
        let mut invalids = LiteralSet::new();
        if schema_type == SchemaType::String {
            invalids.add(Value::String(String::new()));
        }
        Self {
            schema_type,
            flags: Flags::default(),
            settings: None,
            valids: LiteralSet::new(),
            invalids,
            tests: Vec::new(),
            replacements: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// Shared handle to a schema node.
///
/// Two schemas are equal when their descriptions are equal.
#[derive(Debug, Clone)]
pub struct Schema {
    node: Arc<SchemaNode>,
}

impl Schema {
    pub(crate) fn new(schema_type: SchemaType) -> Self {
        Self {
            node: Arc::new(SchemaNode::new(schema_type)),
        }
    }

    /// A schema accepting any present value.
    pub fn any() -> Self {
        Self::new(SchemaType::Any)
    }

    /// A string schema; the empty string is invalid until allowed.
    pub fn string() -> StringSchema {
        StringSchema::new()
    }

    /// A number, or a numeric string when converting.
    pub fn number() -> Self {
        Self::new(SchemaType::Number)
    }

    /// An object with no declared keys; undeclared keys fail.
    pub fn object() -> ObjectSchema {
        ObjectSchema::new()
    }

    pub fn schema_type(&self) -> SchemaType {
        self.node.schema_type
    }

    /// The shared node behind this handle.
    pub fn node(&self) -> &SchemaNode {
        &self.node
    }

    /// Whether both handles point at the same node.
    pub fn shares_node_with(&self, other: &Schema) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    pub(crate) fn node_mut(&mut self) -> &mut SchemaNode {
        Arc::make_mut(&mut self.node)
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.shares_node_with(other) || describe::describe(self) == describe::describe(other)
    }
}

/// Builder methods and entry points shared by every schema type.
pub trait SchemaBuilder: Sized {
    fn as_schema(&self) -> &Schema;

    fn as_schema_mut(&mut self) -> &mut Schema;

    /// Accept these literals, bypassing every other constraint.
    fn allow<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let node = self.as_schema_mut().node_mut();
        for value in values {
            let value = value.into();
            node.invalids.remove(&value);
            node.valids.add(value);
        }
        self
    }

    /// Accept only these literals (and any allowed earlier).
    fn valid<I>(self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let mut builder = self.allow(values);
        builder.as_schema_mut().node_mut().flags.allow_only = true;
        builder
    }

    /// Reject these literals.
    fn invalid<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let node = self.as_schema_mut().node_mut();
        for value in values {
            let value = value.into();
            node.valids.remove(&value);
            node.invalids.add(value);
        }
        self
    }

    fn presence(mut self, presence: Presence) -> Self {
        self.as_schema_mut().node_mut().flags.presence = Some(presence);
        self
    }

    fn required(self) -> Self {
        self.presence(Presence::Required)
    }

    fn optional(self) -> Self {
        self.presence(Presence::Optional)
    }

    fn forbidden(self) -> Self {
        self.presence(Presence::Forbidden)
    }

    /// Name used for this node in messages instead of its key.
    fn label(mut self, label: &str) -> Self {
        self.as_schema_mut().node_mut().flags.label = Some(label.to_string());
        self
    }

    /// Value produced when the input is absent.
    fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.as_schema_mut().node_mut().flags.default = Some(value.into());
        self
    }

    /// Layer option overrides onto this node; they cascade to descendants.
    fn options(mut self, settings: SchemaSettings) -> Self {
        self.as_schema_mut()
            .node_mut()
            .settings
            .get_or_insert_with(SchemaSettings::default)
            .merge(&settings);
        self
    }

    /// Disable conversion for this node and its descendants.
    fn strict(self) -> Self {
        self.options(SchemaSettings {
            convert: Some(false),
            ..SchemaSettings::default()
        })
    }

    /// Validate with default options. `None` is an absent value.
    fn validate(&self, value: impl Into<Option<Value>>) -> ValidationResult {
        self.validate_with(value, &ValidationOptions::default())
    }

    fn validate_with(
        &self,
        value: impl Into<Option<Value>>,
        options: &ValidationOptions,
    ) -> ValidationResult {
        engine::validate(self.as_schema(), value.into().as_ref(), options)
    }

    fn describe(&self) -> Description {
        describe::describe(self.as_schema())
    }
}

impl SchemaBuilder for Schema {
    fn as_schema(&self) -> &Schema {
        self
    }

    fn as_schema_mut(&mut self) -> &mut Schema {
        self
    }
}

/// Builder for object schemas.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSchema {
    schema: Schema,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self {
            schema: Schema::new(SchemaType::Object),
        }
    }

    /// Declare `key`. Redeclaring a key replaces its schema in place.
    pub fn key(mut self, key: &str, schema: impl Into<Schema>) -> Self {
        let schema = schema.into();
        let children = &mut self.schema.node_mut().children;
        match children.iter_mut().find(|child| child.key == key) {
            Some(child) => child.schema = schema,
            None => children.push(Child {
                key: key.to_string(),
                schema,
            }),
        }
        self
    }

    /// Declare several keys in order, as by [`ObjectSchema::key`].
    pub fn keys<I, S>(self, children: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, S)>,
        S: Into<Schema>,
    {
        children
            .into_iter()
            .fold(self, |object, (key, schema)| object.key(key, schema))
    }
}

impl Default for ObjectSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaBuilder for ObjectSchema {
    fn as_schema(&self) -> &Schema {
        &self.schema
    }

    fn as_schema_mut(&mut self) -> &mut Schema {
        &mut self.schema
    }
}

impl From<ObjectSchema> for Schema {
    fn from(object: ObjectSchema) -> Self {
        object.schema
    }
}
