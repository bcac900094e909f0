//! Change queue and flush scheduler (v0.1)
//!
//! Collects bindings whose source value changed and applies them in a
//! single guarded flush pass. Two pending sets are swapped so that side
//! effects of applying one batch land in a fresh batch, and a `flushing`
//! flag absorbs re-entrant flush calls into the pass already in progress.
//!
//! Within a batch there is no ordering guarantee: the pending collection
//! is a set keyed by binding id, and callers must only rely on the queue
//! draining to emptiness.

use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use tracing::{instrument, trace};

use crate::binding::Binding;

/// Process-wide flush coordinator. Cloning shares the same queue.
#[derive(Clone, Default)]
pub struct FlushCoordinator {
    inner: Rc<RefCell<CoordinatorState>>,
}

#[derive(Default)]
struct CoordinatorState {
    /// Bindings awaiting the next flush batch.
    active: FxHashMap<u64, Binding>,
    /// Batch currently being drained; empty between batches.
    draining: FxHashMap<u64, Binding>,
    /// Guard flag: a flush pass is in progress.
    flushing: bool,
}

impl FlushCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a binding for the next flush. Queueing an already-pending
    /// binding is a no-op.
    pub fn enqueue(&self, binding: &Binding) {
        let mut state = self.inner.borrow_mut();
        state
            .active
            .entry(binding.id())
            .or_insert_with(|| binding.clone());
    }

    /// Number of bindings awaiting the next flush batch.
    pub fn pending_count(&self) -> usize {
        self.inner.borrow().active.len()
    }

    /// Drain all pending bindings to a fixed point.
    ///
    /// Re-entrant calls are absorbed: a property write inside an apply can
    /// trigger observers that call flush again, and the guard makes those
    /// inner calls return immediately while the outer loop picks up
    /// whatever they enqueued.
    #[instrument(skip(self), level = "debug")]
    pub fn flush_pending_changes(&self) {
        {
            let mut state = self.inner.borrow_mut();
            if state.flushing {
                return;
            }
            state.flushing = true;
        }

        loop {
            {
                let mut state = self.inner.borrow_mut();
                if state.active.is_empty() {
                    break;
                }
                // The draining set is always empty here; swapping captures
                // the current batch and gives new enqueues a fresh set.
                let CoordinatorState {
                    active, draining, ..
                } = &mut *state;
                mem::swap(active, draining);
                trace!(batch = state.draining.len(), "draining flush batch");
            }
            // Bindings are applied with no queue borrow held; applying one
            // may enqueue others.
            while let Some(binding) = self.take_drained() {
                binding.apply_pending_value();
            }
        }

        self.inner.borrow_mut().flushing = false;
    }

    fn take_drained(&self) -> Option<Binding> {
        let mut state = self.inner.borrow_mut();
        let id = *state.draining.keys().next()?;
        state.draining.remove(&id)
    }
}
