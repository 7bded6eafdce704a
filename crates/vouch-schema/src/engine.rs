//! # Validation Engine
//!
//! Walks a schema tree against a candidate value. Per node:
//!
//! 1. **Presence.** An absent value passes (yielding the default, if any)
//!    unless the node is required. A present value fails a forbidden node.
//! 2. **Literals.** A member of `valids` passes immediately. A member of
//!    `invalids` fails with `any.empty` for `""`, else `any.invalid`.
//! 3. **Base.** The type check and, when converting, the type's conversion.
//!    Objects validate their children here. A base failure ends the node.
//!    A converted value is checked against the literal sets again.
//! 4. **Restriction.** A node restricted to its valids fails with `any.only`.
//! 5. **Tests** in registration order.
//!
//! Under `abort_early` the first failure anywhere ends the whole walk.
//! Schemas are never mutated; everything per call lives on the stack.

use serde_json::{Map, Number, Value};
use tracing::{debug, trace};
use vouch_core::{
    ErrorKind, Failure, Presence, ValidationError, ValidationOptions, ValidationState, Violation,
};

use crate::rules::RuleContext;
use crate::schema::{Schema, SchemaNode, SchemaType};
use crate::string;

/// Largest integer a JSON number holds exactly as an `f64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Outcome of one `validate` call.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    /// The converted value. `None` when the input was absent without default.
    pub value: Option<Value>,
    pub error: Option<ValidationError>,
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<Option<Value>, ValidationError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.value),
        }
    }
}

/// Validate `value` (`None` when absent) against `schema`.
pub fn validate(
    schema: &Schema,
    value: Option<&Value>,
    options: &ValidationOptions,
) -> ValidationResult {
    let state = ValidationState::root();
    let outcome = walk(schema, value, &state, options);
    let error = ValidationError::from_failures(&outcome.failures);
    if let Some(error) = &error {
        debug!(
            failures = error.len(),
            schema_type = %schema.schema_type(),
            "validation failed"
        );
    }
    ValidationResult {
        value: outcome.value,
        error,
    }
}

struct Outcome {
    value: Option<Value>,
    failures: Vec<Failure>,
}

fn walk(
    schema: &Schema,
    value: Option<&Value>,
    state: &ValidationState<'_>,
    options: &ValidationOptions,
) -> Outcome {
    let node = schema.node();
    let merged;
    let options = match &node.settings {
        Some(settings) => {
            merged = options.merged(settings);
            &merged
        }
        None => options,
    };
    trace!(path = %state, schema_type = %node.schema_type, "validating node");
    NodeWalk {
        node,
        state,
        options,
        label: state.label(node.flags.label.as_deref()),
        failures: Vec::new(),
    }
    .run(value)
}

struct NodeWalk<'a, 'v> {
    node: &'a SchemaNode,
    state: &'a ValidationState<'v>,
    options: &'a ValidationOptions,
    label: &'a str,
    failures: Vec<Failure>,
}

impl<'a, 'v> NodeWalk<'a, 'v> {
    fn run(mut self, value: Option<&Value>) -> Outcome {
        let node = self.node;
        let presence = node.flags.presence.unwrap_or(self.options.presence);

        let Some(original) = value else {
            if presence == Presence::Required {
                self.fail(Violation::new(ErrorKind::AnyRequired));
                return self.done(None);
            }
            return self.done(node.flags.default.clone());
        };
        if presence == Presence::Forbidden {
            self.fail(Violation::new(ErrorKind::AnyUnknown));
            return self.done(Some(original.clone()));
        }

        let insensitive = node.flags.insensitive;
        if node.valids.contains(original, insensitive) {
            return self.done(Some(original.clone()));
        }
        if node.invalids.contains(original, insensitive) && self.fail(invalid(original)) {
            return self.done(Some(original.clone()));
        }

        let value = match self.base(original) {
            Ok(value) => value,
            Err(value) => return self.done(Some(value)),
        };
        if value != *original {
            if node.valids.contains(&value, insensitive) {
                return self.done(Some(value));
            }
            if node.invalids.contains(&value, insensitive) && self.fail(invalid(&value)) {
                return self.done(Some(value));
            }
        }

        if node.flags.allow_only {
            let valids = Value::Array(node.valids.values().to_vec());
            if self.fail(Violation::new(ErrorKind::AnyOnly).with("valids", valids)) {
                return self.done(Some(value));
            }
        }

        if let Value::String(text) = &value {
            let ctx = self.rule_context();
            for rule in &node.tests {
                if let Err(violation) = rule.check(text, &ctx) {
                    if self.fail(violation) {
                        return self.done(Some(value));
                    }
                }
            }
        }
        self.done(Some(value))
    }

    /// Type check and conversion. `Err` carries the value reached so far.
    fn base(&mut self, original: &Value) -> Result<Value, Value> {
        let node = self.node;
        match node.schema_type {
            SchemaType::Any => Ok(original.clone()),
            SchemaType::String => match original {
                Value::String(text) if self.options.convert => {
                    let ctx = self.rule_context();
                    Ok(Value::String(string::convert(node, text, &ctx)))
                }
                Value::String(_) => Ok(original.clone()),
                _ => {
                    self.fail(Violation::new(ErrorKind::StringBase));
                    Err(original.clone())
                }
            },
            SchemaType::Number => match to_number(original, self.options.convert) {
                Some(number) => Ok(number),
                None => {
                    self.fail(Violation::new(ErrorKind::NumberBase));
                    Err(original.clone())
                }
            },
            SchemaType::Object => match original {
                Value::Object(map) => self.children(map),
                _ => {
                    self.fail(Violation::new(ErrorKind::ObjectBase));
                    Err(original.clone())
                }
            },
        }
    }

    /// Validate declared keys in order, then reject undeclared ones.
    fn children(&mut self, map: &Map<String, Value>) -> Result<Value, Value> {
        let node = self.node;
        let options = self.options;
        let before = self.failures.len();
        let mut target = map.clone();

        for child in &node.children {
            // Siblings are read from the object as converted so far.
            let outcome = {
                let state = self.state.child(&child.key, &target);
                walk(&child.schema, map.get(&child.key), &state, options)
            };
            if let Some(value) = outcome.value {
                target.insert(child.key.clone(), value);
            }
            if !outcome.failures.is_empty() {
                let label = child
                    .schema
                    .node()
                    .flags
                    .label
                    .as_deref()
                    .unwrap_or(child.key.as_str());
                let path = self.state.child_path(&child.key);
                self.failures
                    .push(Failure::child(path, label, outcome.failures));
                if self.stopping() {
                    return Err(Value::Object(target));
                }
            }
        }

        if !options.allow_unknown {
            for key in map.keys() {
                if node.children.iter().any(|child| &child.key == key) {
                    continue;
                }
                let violation =
                    Violation::new(ErrorKind::ObjectAllowUnknown).with("child", key.as_str());
                self.failures
                    .push(Failure::new(violation, self.state.child_path(key), key));
                if self.stopping() {
                    return Err(Value::Object(target));
                }
            }
        }

        if self.failures.len() > before {
            Err(Value::Object(target))
        } else {
            Ok(Value::Object(target))
        }
    }

    fn rule_context(&self) -> RuleContext<'a> {
        let options = self.options;
        RuleContext {
            parent: self.state.parent(),
            context: &options.context,
            convert: options.convert,
        }
    }

    /// Record a failure at this node. Returns whether the walk stops here.
    fn fail(&mut self, violation: Violation) -> bool {
        self.failures.push(Failure::new(
            violation,
            self.state.path().to_vec(),
            self.label,
        ));
        self.stopping()
    }

    fn stopping(&self) -> bool {
        if self.options.abort_early {
            debug!(path = %self.state, "aborting early");
        }
        self.options.abort_early
    }

    fn done(self, value: Option<Value>) -> Outcome {
        Outcome {
            value,
            failures: self.failures,
        }
    }
}

fn invalid(value: &Value) -> Violation {
    if value.as_str() == Some("") {
        Violation::new(ErrorKind::AnyEmpty)
    } else {
        Violation::new(ErrorKind::AnyInvalid).with("value", value.clone())
    }
}

/// A number, or a numeric string under conversion.
fn to_number(value: &Value, convert: bool) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(text) if convert => {
            let parsed = text.trim().parse::<f64>().ok().filter(|n| n.is_finite())?;
            if parsed.fract() == 0.0 && parsed.abs() <= MAX_SAFE_INTEGER {
                Some(Value::from(parsed as i64))
            } else {
                Number::from_f64(parsed).map(Value::Number)
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::schema::SchemaBuilder;

    #[test]
    fn test_absent_value_uses_default() {
        let result = Schema::any().default_value("x").validate(None);
        assert!(result.is_ok());
        assert_eq!(result.value, Some(json!("x")));
        assert_eq!(Schema::any().validate(None).value, None);
    }

    #[test]
    fn test_required_and_forbidden() {
        let error = Schema::any().required().validate(None).error.unwrap();
        assert_eq!(error.message, "\"value\" is required");
        let error = Schema::any().forbidden().validate(json!(1)).error.unwrap();
        assert_eq!(error.message, "\"value\" is not allowed");
        assert!(Schema::any().forbidden().validate(None).is_ok());
    }

    #[test]
    fn test_presence_inherited_from_options() {
        let options = ValidationOptions {
            presence: Presence::Required,
            ..ValidationOptions::default()
        };
        let result = Schema::any().validate_with(None, &options);
        assert_eq!(result.error.unwrap().kinds(), [ErrorKind::AnyRequired]);
        let result = Schema::any().optional().validate_with(None, &options);
        assert!(result.is_ok());
    }

    #[test]
    fn test_only_lists_valids() {
        let schema = Schema::any().valid(["a", "b"]);
        assert!(schema.validate(json!("a")).is_ok());
        let error = schema.validate(json!("c")).error.unwrap();
        assert_eq!(error.message, "\"value\" must be one of [a, b]");
    }

    #[test]
    fn test_number_conversion() {
        let schema = Schema::number();
        assert_eq!(schema.validate(json!(" 12 ")).value, Some(json!(12)));
        assert_eq!(schema.validate(json!("1.5")).value, Some(json!(1.5)));
        let error = schema.validate(json!("x")).error.unwrap();
        assert_eq!(error.message, "\"value\" must be a number");
        let strict = schema.strict();
        assert_eq!(
            strict.validate(json!("12")).error.unwrap().kinds(),
            [ErrorKind::NumberBase]
        );
    }

    #[test]
    fn test_object_rejects_unknown_keys() {
        let schema = Schema::object().key("a", Schema::any());
        let error = schema.validate(json!({"a": 1, "b": 2})).error.unwrap();
        assert_eq!(error.message, "\"b\" is not allowed");
        assert_eq!(error.details[0].path, ["b"]);

        let options = ValidationOptions {
            allow_unknown: true,
            ..ValidationOptions::default()
        };
        assert!(schema
            .validate_with(json!({"a": 1, "b": 2}), &options)
            .is_ok());
        assert_eq!(
            schema.validate(json!([1])).error.unwrap().message,
            "\"value\" must be an object"
        );
    }

    #[test]
    fn test_settings_cascade_to_children() {
        let schema = Schema::object()
            .key("a", Schema::number())
            .strict();
        let error = schema.validate(json!({"a": "1"})).error.unwrap();
        assert_eq!(
            error.message,
            "child \"a\" fails because [\"a\" must be a number]"
        );
    }
}
