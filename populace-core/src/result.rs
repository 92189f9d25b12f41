//! The outcome of resolving a single node.

use crate::hints::Hints;
use crate::value::Value;

/// How a node was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// A value (possibly null) was produced.
    Generated,
    /// Generation declined to produce anything.
    Empty,
    /// The node is excluded from generation.
    Ignored,
}

/// A generated value together with its hints.
#[derive(Debug, Clone)]
pub struct NodeResult {
    value: Value,
    hints: Hints,
    status: Status,
}

impl NodeResult {
    /// A generated value with its hints.
    pub fn create(value: Value, hints: Hints) -> Self {
        NodeResult {
            value,
            hints,
            status: Status::Generated,
        }
    }

    /// A null value without hints.
    pub fn null() -> Self {
        Self::create(Value::Null, Hints::new())
    }

    /// A null that was emitted on purpose.
    pub fn emitted_null() -> Self {
        Self::create(Value::Null, Hints::new().with_emit_null())
    }

    /// No value; the parent leaves the position untouched.
    pub fn empty() -> Self {
        NodeResult {
            value: Value::Null,
            hints: Hints::new(),
            status: Status::Empty,
        }
    }

    /// Result for an ignored node.
    pub fn ignored() -> Self {
        NodeResult {
            value: Value::Null,
            hints: Hints::new(),
            status: Status::Ignored,
        }
    }

    /// The generated value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Mutable access for population.
    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    /// Consume the result, keeping the value.
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Hints attached by value generation.
    pub fn hints(&self) -> &Hints {
        &self.hints
    }

    /// How the node was resolved.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Whether the value is null.
    pub fn contains_null(&self) -> bool {
        self.value.is_null()
    }

    /// Whether generation declined to produce a value.
    pub fn is_empty(&self) -> bool {
        self.status == Status::Empty
    }

    /// Whether the node was ignored.
    pub fn is_ignored(&self) -> bool {
        self.status == Status::Ignored
    }

    /// Whether a null was emitted on purpose.
    pub fn has_emit_null_hint(&self) -> bool {
        self.hints.emit_null()
    }

    /// Keep the hints, transform the value.
    pub(crate) fn map_value<F>(self, f: F) -> Self
    where
        F: FnOnce(Value) -> Value,
    {
        NodeResult {
            value: f(self.value),
            hints: self.hints,
            status: self.status,
        }
    }

    /// Keep the hints, replace the value.
    pub(crate) fn replace_value(self, value: Value) -> Self {
        NodeResult {
            value,
            hints: self.hints,
            status: self.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_flags() {
        let null = NodeResult::null();
        assert!(null.contains_null());
        assert!(!null.is_empty());
        assert!(!null.has_emit_null_hint());

        let emitted = NodeResult::emitted_null();
        assert!(emitted.contains_null());
        assert!(emitted.has_emit_null_hint());

        let empty = NodeResult::empty();
        assert!(empty.is_empty());
        assert!(empty.contains_null());

        let ignored = NodeResult::ignored();
        assert!(ignored.is_ignored());
        assert!(!ignored.is_empty());

        let value = NodeResult::create(Value::Int(3), Hints::new());
        assert!(!value.contains_null());
        assert_eq!(value.status(), Status::Generated);
    }

    #[test]
    fn test_replace_value_keeps_hints() {
        let result = NodeResult::create(Value::Int(1), Hints::new().with_emit_null());
        let replaced = result.replace_value(Value::Int(2));
        assert_eq!(replaced.value(), &Value::Int(2));
        assert!(replaced.has_emit_null_hint());
    }
}
