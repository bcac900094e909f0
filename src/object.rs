//! Observable property bags (v0.1)
//!
//! An [`Object`] is an identity-carrying bag of named properties with a
//! per-key observer list. Cloning the handle clones the identity, not the
//! data, so two clones always see the same properties.
//!
//! `set_if_changed` is the write primitive the binding engine uses: it
//! writes and notifies only when the value actually changes, which is what
//! breaks redundant notification cascades between two-way bindings.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::value::Value;

/// A property-change handler, invoked with (changed_key, changed_target).
pub type ObserverFn = Rc<dyn Fn(&str, &Object)>;

/// An identity-carrying observable object.
#[derive(Clone, Default)]
pub struct Object {
    inner: Rc<RefCell<ObjectInner>>,
}

#[derive(Default)]
struct ObjectInner {
    properties: FxHashMap<String, Value>,
    observers: FxHashMap<String, Vec<(u64, ObserverFn)>>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity comparison: two handles to the same object.
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Read a property. Missing keys read as `Null`.
    pub fn get(&self, key: &str) -> Value {
        self.inner
            .borrow()
            .properties
            .get(key)
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Write a property and notify that key's observers synchronously.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        let observers: Vec<ObserverFn> = {
            let mut inner = self.inner.borrow_mut();
            inner.properties.insert(key.clone(), value);
            inner
                .observers
                .get(&key)
                .map(|entries| entries.iter().map(|(_, h)| Rc::clone(h)).collect())
                .unwrap_or_default()
        };
        // No borrow is held here: handlers may re-enter this object.
        for handler in observers {
            handler(&key, self);
        }
    }

    /// Write only if the new value differs from the stored one.
    /// Returns whether a write (and notification) happened.
    pub fn set_if_changed(&self, key: &str, value: impl Into<Value>) -> bool {
        let value = value.into();
        if self.get(key) == value {
            return false;
        }
        self.set(key, value);
        true
    }

    pub(crate) fn attach_observer(&self, key: &str, id: u64, handler: ObserverFn) {
        self.inner
            .borrow_mut()
            .observers
            .entry(key.to_string())
            .or_default()
            .push((id, handler));
    }

    pub(crate) fn detach_observer(&self, key: &str, id: u64) {
        if let Some(entries) = self.inner.borrow_mut().observers.get_mut(key) {
            entries.retain(|(observer_id, _)| *observer_id != id);
        }
    }

    /// Build a nested object tree from a JSON object value. Non-object
    /// JSON yields an empty object.
    pub fn from_json(json: &serde_json::Value) -> Object {
        let object = Object::new();
        if let serde_json::Value::Object(map) = json {
            for (key, value) in map {
                object.set(key.clone(), Value::from_json(value));
            }
        }
        object
    }

    /// Copy the property tree out as JSON (identity is lost).
    pub fn to_json(&self) -> serde_json::Value {
        let inner = self.inner.borrow();
        let map: serde_json::Map<String, serde_json::Value> = inner
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        serde_json::Value::Object(map)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Object")
            .field("properties", &inner.properties.len())
            .field("observed_keys", &inner.observers.len())
            .finish()
    }
}
