//! Built-in transform pipeline functions (v0.1)
//!
//! Each factory returns a pipeline stage `(value, view) -> value`. Stages
//! are pure value mappings; the [`BindingView`] argument is a read-only
//! snapshot of the owning binding's configuration for context-aware
//! transforms.
//!
//! Faults pass through `to_bool`, `negate` and `is_null` unchanged so error
//! visibility survives the pipeline unless the binding suppresses faults
//! explicitly.

use std::rc::Rc;

use crate::binding::BindingView;
use crate::value::Value;

/// A pipeline stage: pure value mapping with a read-only binding context.
pub type TransformFn = Rc<dyn Fn(Value, &BindingView) -> Value>;

/// Placeholder delivered when `single` collapses a multi-element sequence.
pub const MULTIPLE_PLACEHOLDER: &str = "@@(MultipleValues)@@";
/// Placeholder delivered by `not_empty` / `not_null` for missing values.
pub const EMPTY_PLACEHOLDER: &str = "@@(EmptyValue)@@";

pub fn multiple_placeholder() -> Value {
    Value::Str(MULTIPLE_PLACEHOLDER.to_string())
}

pub fn empty_placeholder() -> Value {
    Value::Str(EMPTY_PLACEHOLDER.to_string())
}

/// Sequence → scalar: empty → null, one element → that element, more → the
/// multiple-values placeholder. Non-sequences pass through unchanged.
pub fn single() -> TransformFn {
    single_with(multiple_placeholder())
}

pub fn single_with(placeholder: Value) -> TransformFn {
    Rc::new(move |value, _view| match value {
        Value::List(items) => match items.len() {
            0 => Value::Null,
            1 => items.into_iter().next().unwrap_or(Value::Null),
            _ => placeholder.clone(),
        },
        other => other,
    })
}

/// Null, the empty string and empty sequences map to the empty placeholder;
/// everything else (including `0`) passes through.
pub fn not_empty() -> TransformFn {
    not_empty_with(empty_placeholder())
}

pub fn not_empty_with(placeholder: Value) -> TransformFn {
    Rc::new(move |value, _view| {
        if value.is_empty() {
            placeholder.clone()
        } else {
            value
        }
    })
}

/// Null maps to the empty placeholder; everything else passes through.
pub fn not_null() -> TransformFn {
    not_null_with(empty_placeholder())
}

pub fn not_null_with(placeholder: Value) -> TransformFn {
    Rc::new(move |value, _view| {
        if value.is_null() {
            placeholder.clone()
        } else {
            value
        }
    })
}

/// Sequences pass through, null becomes the empty sequence, anything else
/// is wrapped in a single-element sequence.
pub fn to_array() -> TransformFn {
    Rc::new(|value, _view| match value {
        Value::List(_) => value,
        Value::Null => Value::List(Vec::new()),
        other => Value::List(vec![other]),
    })
}

/// Truthiness; sequences map to length > 0; faults pass through unchanged.
pub fn to_bool() -> TransformFn {
    Rc::new(|value, _view| match value {
        Value::Fault(_) => value,
        other => Value::Bool(other.is_truthy()),
    })
}

/// Inverted truthiness; faults pass through unchanged.
pub fn negate() -> TransformFn {
    Rc::new(|value, _view| match value {
        Value::Fault(_) => value,
        other => Value::Bool(!other.is_truthy()),
    })
}

/// Null check; faults pass through unchanged.
pub fn is_null() -> TransformFn {
    Rc::new(|value, _view| match value {
        Value::Fault(_) => value,
        other => Value::Bool(other.is_null()),
    })
}
