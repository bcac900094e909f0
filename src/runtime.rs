//! Process-wide binding runtime (v0.1)
//!
//! One [`BindingRuntime`] bundles the flush coordinator, the observer
//! registry, and the default global root object. Create it once at startup
//! and pass it explicitly to `connect`; there are no ambient globals.
//! Cloning shares the same services.

use tracing::debug;

use crate::flush::FlushCoordinator;
use crate::object::Object;
use crate::observer::ObserverRegistry;

#[derive(Clone, Default)]
pub struct BindingRuntime {
    coordinator: FlushCoordinator,
    registry: ObserverRegistry,
    globals: Object,
}

impl BindingRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn coordinator(&self) -> &FlushCoordinator {
        &self.coordinator
    }

    pub fn registry(&self) -> &ObserverRegistry {
        &self.registry
    }

    /// Default root for paths bound without an explicit root. Named roots
    /// ("account", "settings", ...) live as properties of this object.
    pub fn globals(&self) -> &Object {
        &self.globals
    }

    /// Attach parked observers whose roots have since appeared, then drain
    /// the pending-change queue to a fixed point.
    pub fn flush(&self) {
        debug!(
            pending = self.coordinator.pending_count(),
            parked = self.registry.parked_count(),
            "flush requested"
        );
        self.registry.retry_pending();
        self.coordinator.flush_pending_changes();
    }
}

impl std::fmt::Debug for BindingRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingRuntime")
            .field("pending", &self.coordinator.pending_count())
            .field("parked", &self.registry.parked_count())
            .finish()
    }
}
