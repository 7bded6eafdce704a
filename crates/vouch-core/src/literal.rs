//! Ordered literal sets backing `valids` and `invalids`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Insertion-ordered set of JSON literals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LiteralSet {
    values: Vec<Value>,
}

impl LiteralSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` unless already present (exact comparison).
    pub fn add(&mut self, value: Value) {
        if !self.values.contains(&value) {
            self.values.push(value);
        }
    }

    /// Remove `value` if present (exact comparison).
    pub fn remove(&mut self, value: &Value) {
        self.values.retain(|existing| existing != value);
    }

    /// Membership test. With `insensitive`, strings compare case-folded.
    pub fn contains(&self, value: &Value, insensitive: bool) -> bool {
        match value {
            Value::String(candidate) if insensitive => {
                let folded = candidate.to_lowercase();
                self.values.iter().any(|existing| match existing {
                    Value::String(s) => s.to_lowercase() == folded,
                    _ => false,
                })
            }
            _ => self.values.contains(value),
        }
    }

    /// Members in insertion order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// True when the set has no members.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.values.len()
    }
}

impl FromIterator<Value> for LiteralSet {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.add(value);
        }
        set
    }
}
