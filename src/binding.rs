//! Binding descriptors and the value application engine (v0.1)
//!
//! A [`Binding`] starts life as a template, is derived into independent
//! instances, given concrete from/to endpoints, then connected. Once
//! connected it listens for property changes, records the observed value as
//! pending, and queues itself with the flush coordinator. During a flush
//! the pending value is echoed raw toward the from-endpoint when two-way,
//! run through the transform pipeline, and written to the to-endpoint with
//! set-if-changed semantics.
//!
//! Direction of transforms is deliberately asymmetric: transforms apply
//! only from → to, and a to-side change on a two-way binding is echoed
//! untransformed back toward the from-endpoint.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

use crate::error::TetherError;
use crate::object::{Object, ObserverFn};
use crate::path;
use crate::runtime::BindingRuntime;
use crate::transforms::{self, TransformFn};
use crate::value::Value;

/// Monotonic binding ids (queue membership, observer bookkeeping).
static NEXT_BINDING_ID: AtomicU64 = AtomicU64::new(1);

fn next_binding_id() -> u64 {
    NEXT_BINDING_ID.fetch_add(1, Ordering::Relaxed)
}

/// Read-only configuration snapshot handed to transform functions.
///
/// Transforms see configuration, never the binding's resolution state.
#[derive(Debug, Clone)]
pub struct BindingView {
    one_way: bool,
    suppress_faults: bool,
    from_path: Option<String>,
    to_path: Option<String>,
}

impl BindingView {
    /// A view with no binding behind it, for exercising transforms
    /// standalone.
    pub fn detached() -> Self {
        Self {
            one_way: false,
            suppress_faults: false,
            from_path: None,
            to_path: None,
        }
    }

    pub fn is_one_way(&self) -> bool {
        self.one_way
    }

    pub fn suppresses_faults(&self) -> bool {
        self.suppress_faults
    }

    pub fn from_path(&self) -> Option<&str> {
        self.from_path.as_deref()
    }

    pub fn to_path(&self) -> Option<&str> {
        self.to_path.as_deref()
    }
}

struct BindingState {
    id: u64,
    from_path: Option<String>,
    from_root: Option<Object>,
    to_path: Option<String>,
    to_root: Option<Object>,
    one_way: bool,
    suppress_faults: bool,
    transforms: Rc<Vec<TransformFn>>,
    /// Non-owning link to the template this instance was derived from.
    /// Witnesses derivation only; never a dynamic lookup chain.
    parent: Option<Weak<RefCell<BindingState>>>,
    connected: bool,
    /// Endpoint caches, valid for one connection lifetime.
    resolved_from: Option<(Object, String)>,
    resolved_to: Option<(Object, String)>,
    /// Last observed value. Doubles as the last-known value for the change
    /// handler's strict-inequality comparison; queue membership, not this
    /// field, means "awaiting flush".
    pending_value: Option<Value>,
    /// Observer registration ids while connected.
    from_observer: Option<u64>,
    to_observer: Option<u64>,
    runtime: Option<BindingRuntime>,
}

impl BindingState {
    fn template() -> Self {
        Self {
            id: next_binding_id(),
            from_path: None,
            from_root: None,
            to_path: None,
            to_root: None,
            one_way: false,
            suppress_faults: false,
            transforms: Rc::new(Vec::new()),
            parent: None,
            connected: false,
            resolved_from: None,
            resolved_to: None,
            pending_value: None,
            from_observer: None,
            to_observer: None,
            runtime: None,
        }
    }
}

/// A configured, potentially-connected relationship between two named
/// properties on two objects. Cloning shares the underlying record.
#[derive(Clone)]
pub struct Binding {
    inner: Rc<RefCell<BindingState>>,
}

impl Binding {
    /// Create a fresh un-derived template.
    pub fn template() -> Binding {
        Binding {
            inner: Rc::new(RefCell::new(BindingState::template())),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.borrow().id
    }

    pub fn is_connected(&self) -> bool {
        self.inner.borrow().connected
    }

    /// Whether this is an un-derived template (no parent).
    pub fn is_template(&self) -> bool {
        self.inner.borrow().parent.is_none()
    }

    pub fn is_one_way(&self) -> bool {
        self.inner.borrow().one_way
    }

    pub fn suppresses_faults(&self) -> bool {
        self.inner.borrow().suppress_faults
    }

    pub fn transform_count(&self) -> usize {
        self.inner.borrow().transforms.len()
    }

    // ─────────────────────────────────────────────────────────────
    // Templating
    // ─────────────────────────────────────────────────────────────

    /// Derive an independent instance from this binding.
    ///
    /// Configuration is copied; the transform pipeline is shared until the
    /// derived instance appends to it (copy-on-write). The receiver is
    /// never mutated.
    pub fn derive(&self) -> Binding {
        let state = self.inner.borrow();
        let derived = BindingState {
            id: next_binding_id(),
            from_path: state.from_path.clone(),
            from_root: state.from_root.clone(),
            to_path: state.to_path.clone(),
            to_root: state.to_root.clone(),
            one_way: state.one_way,
            suppress_faults: state.suppress_faults,
            transforms: Rc::clone(&state.transforms),
            parent: Some(Rc::downgrade(&self.inner)),
            connected: false,
            resolved_from: None,
            resolved_to: None,
            pending_value: None,
            from_observer: None,
            to_observer: None,
            runtime: None,
        };
        Binding {
            inner: Rc::new(RefCell::new(derived)),
        }
    }

    /// `derive()` + `from(path)` in one step; the template shorthand.
    pub fn derive_from(&self, path: impl Into<String>) -> Binding {
        self.derive().from(path)
    }

    // ─────────────────────────────────────────────────────────────
    // Endpoint configuration
    // ─────────────────────────────────────────────────────────────

    /// Set the from-endpoint path.
    ///
    /// An empty path is a no-op so optional-path call chains keep flowing.
    /// Called on an un-derived template this derives first; a shared
    /// template is never mutated.
    pub fn from(&self, path: impl Into<String>) -> Binding {
        let path = path.into();
        if path.is_empty() {
            return self.clone();
        }
        let target = if self.is_template() {
            self.derive()
        } else {
            self.clone()
        };
        target.inner.borrow_mut().from_path = Some(path);
        target
    }

    /// Set the from-endpoint with an explicit root object.
    pub fn from_in(&self, path: impl Into<String>, root: &Object) -> Binding {
        let path = path.into();
        if path.is_empty() {
            return self.clone();
        }
        let bound = self.from(path);
        bound.inner.borrow_mut().from_root = Some(root.clone());
        bound
    }

    /// Set the to-endpoint path. Operates on a binding instance; derive a
    /// template before calling this.
    pub fn to(&self, path: impl Into<String>) -> Binding {
        let path = path.into();
        if path.is_empty() {
            return self.clone();
        }
        self.inner.borrow_mut().to_path = Some(path);
        self.clone()
    }

    /// Set the to-endpoint with an explicit root object.
    pub fn to_in(&self, path: impl Into<String>, root: &Object) -> Binding {
        let path = path.into();
        if path.is_empty() {
            return self.clone();
        }
        let mut state = self.inner.borrow_mut();
        state.to_path = Some(path);
        state.to_root = Some(root.clone());
        drop(state);
        self.clone()
    }

    /// Restrict propagation to from → to; the to-endpoint is not observed.
    /// Called on an un-derived template this derives first, like [`from`].
    ///
    /// [`from`]: Binding::from
    pub fn one_way(&self) -> Binding {
        let target = if self.is_template() {
            self.derive()
        } else {
            self.clone()
        };
        target.inner.borrow_mut().one_way = true;
        target
    }

    /// `from(path)` + `one_way()` in one step.
    pub fn one_way_from(&self, path: impl Into<String>) -> Binding {
        self.from(path).one_way()
    }

    /// Coerce fault-typed final values to null before they reach the
    /// destination. Called on an un-derived template this derives first,
    /// like [`from`].
    ///
    /// [`from`]: Binding::from
    pub fn suppress_faults(&self) -> Binding {
        let target = if self.is_template() {
            self.derive()
        } else {
            self.clone()
        };
        target.inner.borrow_mut().suppress_faults = true;
        target
    }

    /// `from(path)` + `suppress_faults()` in one step.
    pub fn suppress_faults_from(&self, path: impl Into<String>) -> Binding {
        self.from(path).suppress_faults()
    }

    // ─────────────────────────────────────────────────────────────
    // Transform pipeline
    // ─────────────────────────────────────────────────────────────

    /// Append a transform to the pipeline, copy-on-write against a
    /// pipeline shared with the parent template.
    pub fn transform(&self, f: impl Fn(Value, &BindingView) -> Value + 'static) -> Binding {
        self.transform_fn(Rc::new(f))
    }

    /// Append a prebuilt transform (see the [`transforms`] factories).
    pub fn transform_fn(&self, f: TransformFn) -> Binding {
        let mut state = self.inner.borrow_mut();
        Rc::make_mut(&mut state.transforms).push(f);
        drop(state);
        self.clone()
    }

    /// Clear the transform pipeline on this instance.
    pub fn reset_transforms(&self) -> Binding {
        self.inner.borrow_mut().transforms = Rc::new(Vec::new());
        self.clone()
    }

    // Convenience builders: each derives, optionally sets the from-path,
    // and appends one built-in transform. An empty path leaves the
    // from-endpoint unset.

    pub fn single(&self, path: impl Into<String>) -> Binding {
        self.derive().from(path).transform_fn(transforms::single())
    }

    pub fn not_empty(&self, path: impl Into<String>) -> Binding {
        self.derive()
            .from(path)
            .transform_fn(transforms::not_empty())
    }

    pub fn not_null(&self, path: impl Into<String>) -> Binding {
        self.derive().from(path).transform_fn(transforms::not_null())
    }

    pub fn to_array(&self, path: impl Into<String>) -> Binding {
        self.derive().from(path).transform_fn(transforms::to_array())
    }

    pub fn to_bool(&self, path: impl Into<String>) -> Binding {
        self.derive().from(path).transform_fn(transforms::to_bool())
    }

    pub fn negate(&self, path: impl Into<String>) -> Binding {
        self.derive().from(path).transform_fn(transforms::negate())
    }

    pub fn is_null(&self, path: impl Into<String>) -> Binding {
        self.derive().from(path).transform_fn(transforms::is_null())
    }

    // ─────────────────────────────────────────────────────────────
    // Connection
    // ─────────────────────────────────────────────────────────────

    /// Connect to live change notifications. Idempotent.
    ///
    /// Fails when either endpoint path is missing or syntactically
    /// invalid; the binding stays unconnected in that case. The
    /// from-endpoint is always observed; the to-endpoint only when the
    /// binding is two-way.
    pub fn connect(&self, runtime: &BindingRuntime) -> Result<Binding, TetherError> {
        let (from_path, from_root, to_path, to_root, one_way) = {
            let state = self.inner.borrow();
            if state.connected {
                return Ok(self.clone());
            }
            let from_path = state.from_path.clone().ok_or(TetherError::MissingFromPath)?;
            let to_path = state.to_path.clone().ok_or(TetherError::MissingToPath)?;
            path::parse(&from_path)?;
            path::parse(&to_path)?;
            (
                from_path,
                state.from_root.clone(),
                to_path,
                state.to_root.clone(),
                state.one_way,
            )
        };

        let registry = runtime.registry();
        let from_root = from_root.unwrap_or_else(|| runtime.globals().clone());
        let from_observer = registry.add_observer(&from_root, &from_path, self.change_handler());
        let to_observer = if one_way {
            None
        } else {
            let to_root = to_root.unwrap_or_else(|| runtime.globals().clone());
            Some(registry.add_observer(&to_root, &to_path, self.change_handler()))
        };

        {
            let mut state = self.inner.borrow_mut();
            state.from_observer = Some(from_observer);
            state.to_observer = to_observer;
            state.runtime = Some(runtime.clone());
            state.connected = true;
        }
        debug!(id = self.id(), from_path = %from_path, to_path = %to_path, one_way, "binding connected");
        Ok(self.clone())
    }

    /// Disconnect from change notifications. Idempotent.
    ///
    /// Cached endpoint resolution is invalidated so a reconnect (possibly
    /// against different roots) resolves fresh.
    pub fn disconnect(&self) -> Binding {
        let (runtime, from_observer, to_observer) = {
            let mut state = self.inner.borrow_mut();
            if !state.connected {
                return self.clone();
            }
            state.connected = false;
            state.resolved_from = None;
            state.resolved_to = None;
            (
                state.runtime.take(),
                state.from_observer.take(),
                state.to_observer.take(),
            )
        };
        if let Some(runtime) = runtime {
            let registry = runtime.registry();
            if let Some(id) = from_observer {
                registry.remove_observer(id);
            }
            if let Some(id) = to_observer {
                registry.remove_observer(id);
            }
        }
        debug!(id = self.id(), "binding disconnected");
        self.clone()
    }

    // The registration holds the binding strongly: a connected binding
    // stays alive (and observing) until its owner disconnects it.
    fn change_handler(&self) -> ObserverFn {
        let binding = self.clone();
        Rc::new(move |key: &str, target: &Object| {
            binding.on_property_change(key, target);
        })
    }

    /// Change-notification handler for either endpoint.
    ///
    /// Reads the current value, compares it against the last-known value
    /// with strict inequality, and queues the binding when it differs. The
    /// handler does not know which side changed; apply decides direction.
    fn on_property_change(&self, key: &str, target: &Object) {
        let observed = target.get(key);
        let coordinator = {
            let mut state = self.inner.borrow_mut();
            if state.pending_value.as_ref() == Some(&observed) {
                return;
            }
            state.pending_value = Some(observed);
            state
                .runtime
                .as_ref()
                .map(|runtime| runtime.coordinator().clone())
        };
        if let Some(coordinator) = coordinator {
            trace!(id = self.id(), key, "change recorded, binding queued");
            coordinator.enqueue(self);
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Value application
    // ─────────────────────────────────────────────────────────────

    /// Apply the pending value: resolve endpoints lazily, echo the raw
    /// value toward the from-endpoint when two-way, run the transform
    /// pipeline, and write the result to the to-endpoint.
    ///
    /// An endpoint that cannot be resolved yet simply receives no write;
    /// resolution is retried on the next application.
    pub fn apply_pending_value(&self) {
        let (pending, resolved_from, resolved_to, pipeline, one_way, suppress_faults, view) = {
            let mut state = self.inner.borrow_mut();
            let Some(pending) = state.pending_value.clone() else {
                return;
            };
            let Some(runtime) = state.runtime.clone() else {
                return;
            };
            if state.resolved_from.is_none() {
                if let Some(from_path) = state.from_path.clone() {
                    let root = state
                        .from_root
                        .clone()
                        .unwrap_or_else(|| runtime.globals().clone());
                    state.resolved_from = path::resolve(&root, &from_path);
                }
            }
            if state.resolved_to.is_none() {
                if let Some(to_path) = state.to_path.clone() {
                    let root = state
                        .to_root
                        .clone()
                        .unwrap_or_else(|| runtime.globals().clone());
                    state.resolved_to = path::resolve(&root, &to_path);
                }
            }
            let view = BindingView {
                one_way: state.one_way,
                suppress_faults: state.suppress_faults,
                from_path: state.from_path.clone(),
                to_path: state.to_path.clone(),
            };
            (
                pending,
                state.resolved_from.clone(),
                state.resolved_to.clone(),
                Rc::clone(&state.transforms),
                state.one_way,
                state.suppress_faults,
                view,
            )
        };

        // Two-way: echo the raw value toward the from-endpoint. Transforms
        // never run in this direction.
        if !one_way {
            if let Some((target, key)) = &resolved_from {
                target.set_if_changed(key, pending.clone());
            }
        }

        let mut value = pending;
        for stage in pipeline.iter() {
            value = stage(value, &view);
        }
        if suppress_faults && value.is_fault() {
            value = Value::Null;
        }
        if let Some((target, key)) = &resolved_to {
            trace!(id = self.id(), key = %key, "writing transformed value");
            target.set_if_changed(key, value);
        }
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("Binding")
            .field("id", &state.id)
            .field("from", &state.from_path)
            .field("to", &state.to_path)
            .field("one_way", &state.one_way)
            .field("connected", &state.connected)
            .field("transforms", &state.transforms.len())
            .finish()
    }
}
