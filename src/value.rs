//! Dynamic value model (v0.1)
//!
//! Every value flowing through a binding is a `Value`: plain data, an
//! identity-carrying [`Object`], or a [`Fault`] (a domain error travelling
//! as data rather than as `Err`).
//!
//! Comparison follows the host's strict-equality semantics: data compares
//! structurally, objects compare by identity, and `Int`/`Float` compare
//! numerically so a two-way binding does not ping-pong between `1` and
//! `1.0`.

use serde::{Deserialize, Serialize};

use crate::object::Object;

/// A domain error carried through a binding as a value.
///
/// Faults propagate through transform pipelines like any other value;
/// several built-in transforms pass them through untouched so error
/// visibility survives unless a binding suppresses faults explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fault {
    pub code: String,
    pub message: String,
}

impl Fault {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// A dynamic property value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Object(Object),
    Fault(Fault),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Int(a), Float(b)) | (Float(b), Int(a)) => *a as f64 == *b,
            (Str(a), Str(b)) => a == b,
            (List(a), List(b)) => a == b,
            (Object(a), Object(b)) => a.ptr_eq(b),
            (Fault(a), Fault(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, Value::Fault(_))
    }

    /// Host truthiness: null and empty strings are false, numbers are
    /// compared against zero, sequences against emptiness. Objects and
    /// faults count as truthy (faults are handled before truthiness by the
    /// transforms that care).
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Object(_) => true,
            Value::Fault(_) => true,
        }
    }

    /// Emptiness as the `not_empty` transform sees it: null, the empty
    /// string, or an empty sequence. `0` is not empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Str(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
            _ => false,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Build a `Value` from a JSON value. Numbers become `Int` when they
    /// fit, JSON objects become fresh [`Object`] identities.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(0.0)),
            },
            serde_json::Value::String(s) => Value::Str(s.clone()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(_) => Value::Object(Object::from_json(json)),
        }
    }

    /// Serialize to JSON for logging and inspection. Object identity is
    /// lost (properties are copied out); faults serialize under `$fault`;
    /// non-finite floats become null.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(object) => object.to_json(),
            Value::Fault(fault) => serde_json::json!({ "$fault": fault }),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}

impl From<Fault> for Value {
    fn from(fault: Fault) -> Self {
        Value::Fault(fault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn structural_equality_for_data() {
        assert_eq!(Value::from("a"), Value::from("a"));
        assert_ne!(Value::from("a"), Value::from("b"));
        assert_eq!(
            Value::List(vec![Value::from(1)]),
            Value::List(vec![Value::from(1)])
        );
        assert_ne!(Value::from(1), Value::from("1"));
    }

    #[test]
    fn numeric_equality_across_int_and_float() {
        assert_eq!(Value::Int(1), Value::Float(1.0));
        assert_eq!(Value::Float(2.0), Value::Int(2));
        assert_ne!(Value::Int(1), Value::Float(1.5));
    }

    #[test]
    fn object_equality_is_identity() {
        let a = Object::new();
        let b = Object::new();
        assert_eq!(Value::from(a.clone()), Value::from(a.clone()));
        assert_ne!(Value::from(a), Value::from(b));
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(!Value::from(0).is_truthy());
        assert!(!Value::from(0.0).is_truthy());
        assert!(!Value::List(vec![]).is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(Value::from(1).is_truthy());
        assert!(Value::List(vec![Value::Null]).is_truthy());
        assert!(Value::from(Fault::new("E", "boom")).is_truthy());
    }

    #[test]
    fn emptiness_excludes_zero() {
        assert!(Value::Null.is_empty());
        assert!(Value::from("").is_empty());
        assert!(Value::List(vec![]).is_empty());
        assert!(!Value::from(0).is_empty());
        assert!(!Value::from(false).is_empty());
    }

    #[test]
    fn json_round_trip_for_data() {
        let v = Value::from_json(&json!({"n": 3, "s": "x", "l": [1, 2.5], "b": true}));
        let object = v.as_object().expect("object");
        assert_eq!(object.get("n"), Value::Int(3));
        assert_eq!(object.get("s"), Value::from("x"));
        assert_eq!(
            object.get("l"),
            Value::List(vec![Value::Int(1), Value::Float(2.5)])
        );
        assert_eq!(object.get("b"), Value::Bool(true));
    }

    #[test]
    fn fault_serializes_under_marker_key() {
        let fault = Value::from(Fault::new("E42", "broken"));
        let json = fault.to_json();
        assert_eq!(json["$fault"]["code"], "E42");
        assert_eq!(json["$fault"]["message"], "broken");
    }
}
