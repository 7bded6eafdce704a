//! Per-call validation state threaded through the walk.

use std::fmt;

use serde_json::{Map, Value};

/// Position of the node under validation.
///
/// Created fresh for every top-level call; never shared between calls.
#[derive(Debug, Clone, Default)]
pub struct ValidationState<'v> {
    path: Vec<String>,
    parent: Option<&'v Map<String, Value>>,
}

impl<'v> ValidationState<'v> {
    /// State at the document root: empty path, no enclosing object.
    pub fn root() -> Self {
        Self::default()
    }

    /// State for the child `key` of the object `parent`.
    pub fn child<'c>(&self, key: &str, parent: &'c Map<String, Value>) -> ValidationState<'c> {
        let mut path = self.path.clone();
        path.push(key.to_string());
        ValidationState {
            path,
            parent: Some(parent),
        }
    }

    /// Path of the child `key` without entering it.
    pub fn child_path(&self, key: &str) -> Vec<String> {
        let mut path = self.path.clone();
        path.push(key.to_string());
        path
    }

    /// Key segments from the root to this node.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Key of the node in its parent, `None` at the root.
    pub fn key(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }

    /// The object enclosing the node, used for sibling references.
    pub fn parent(&self) -> Option<&'v Map<String, Value>> {
        self.parent
    }

    /// Display label: the explicit label, else the key, else `value`.
    pub fn label<'a>(&'a self, explicit: Option<&'a str>) -> &'a str {
        explicit.or_else(|| self.key()).unwrap_or("value")
    }
}

impl fmt::Display for ValidationState<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.path.join("."))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_label_is_value() {
        let state = ValidationState::root();
        assert_eq!(state.label(None), "value");
        assert_eq!(state.label(Some("Name")), "Name");
        assert!(state.parent().is_none());
        assert_eq!(state.to_string(), "<root>");
    }

    #[test]
    fn test_child_extends_path() {
        let parent = match json!({"a": {"b": 1}}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let state = ValidationState::root();
        let a = state.child("a", &parent);
        let b = a.child("b", &parent);
        assert_eq!(b.path(), ["a", "b"]);
        assert_eq!(b.key(), Some("b"));
        assert_eq!(b.label(None), "b");
        assert_eq!(b.to_string(), "a.b");
    }
}
