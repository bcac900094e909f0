//! Observer registry (v0.1)
//!
//! Registers change handlers against (root, path) endpoints. A registration
//! whose path cannot be resolved yet, typically a named global that has not
//! been defined, is parked and re-attempted on the next flush, so observing
//! something that appears later still works.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::object::{Object, ObserverFn};
use crate::path;

/// Process-wide observer registry. Cloning shares the same registry.
#[derive(Clone, Default)]
pub struct ObserverRegistry {
    inner: Rc<RefCell<RegistryState>>,
}

#[derive(Default)]
struct RegistryState {
    next_id: u64,
    /// Registrations whose paths could not be resolved yet.
    parked: Vec<Registration>,
    /// Live registrations: id → (object it is attached to, key).
    attached: FxHashMap<u64, (Object, String)>,
}

struct Registration {
    id: u64,
    root: Object,
    path: String,
    handler: ObserverFn,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for changes at `path` under `root`.
    /// Returns the registration id used for removal.
    pub fn add_observer(&self, root: &Object, path: &str, handler: ObserverFn) -> u64 {
        let id = {
            let mut state = self.inner.borrow_mut();
            state.next_id += 1;
            state.next_id
        };
        self.try_attach(Registration {
            id,
            root: root.clone(),
            path: path.to_string(),
            handler,
        });
        id
    }

    /// Unregister by id. Works for attached and parked registrations alike.
    pub fn remove_observer(&self, id: u64) {
        let attached = self.inner.borrow_mut().attached.remove(&id);
        match attached {
            Some((target, key)) => target.detach_observer(&key, id),
            None => self.inner.borrow_mut().parked.retain(|r| r.id != id),
        }
    }

    /// Re-attempt parked registrations. Called by the runtime before a
    /// flush pass.
    pub fn retry_pending(&self) {
        let parked = std::mem::take(&mut self.inner.borrow_mut().parked);
        for registration in parked {
            self.try_attach(registration);
        }
    }

    /// Number of registrations still waiting for their path to resolve.
    pub fn parked_count(&self) -> usize {
        self.inner.borrow().parked.len()
    }

    fn try_attach(&self, registration: Registration) {
        match path::resolve(&registration.root, &registration.path) {
            Some((target, key)) => {
                trace!(id = registration.id, path = %registration.path, "observer attached");
                target.attach_observer(&key, registration.id, Rc::clone(&registration.handler));
                self.inner
                    .borrow_mut()
                    .attached
                    .insert(registration.id, (target, key));
            }
            None => {
                debug!(id = registration.id, path = %registration.path, "observer parked: path not resolvable yet");
                self.inner.borrow_mut().parked.push(registration);
            }
        }
    }
}
