//! In-memory source activity state
//!
//! The engine's belief of which sources are currently active, fed by push
//! events and reconciliation pulls. Never persisted; absent entries read as
//! inactive.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::bindings::SourceBindings;

/// Last-known activity per bound source name.
pub struct ActivityStore {
    bindings: Arc<SourceBindings>,
    states: HashMap<String, bool>,
}

impl ActivityStore {
    pub fn new(bindings: Arc<SourceBindings>) -> Self {
        Self {
            bindings,
            states: HashMap::new(),
        }
    }

    /// Record the activity of a source, overwriting any previous value.
    /// Unbound names are dropped.
    pub fn set(&mut self, source: &str, active: bool) {
        if !self.bindings.contains(source) {
            trace!("dropping state for unbound source '{}'", source);
            return;
        }
        self.states.insert(source.to_string(), active);
    }

    /// Bulk variant of [`set`](Self::set), used by reconciliation. Bound
    /// names absent from `states` keep their previous value.
    pub fn set_all(&mut self, states: &HashMap<String, bool>) {
        for (source, active) in states {
            self.set(source, *active);
        }
    }

    /// Mark every bound source inactive.
    pub fn clear_all(&mut self) {
        for name in self.bindings.source_names() {
            self.states.insert(name.to_string(), false);
        }
    }

    /// Whether a source is currently believed active.
    pub fn is_active(&self, source: &str) -> bool {
        self.states.get(source).copied().unwrap_or(false)
    }

    /// The current name-to-activity view, for projection.
    pub fn snapshot(&self) -> &HashMap<String, bool> {
        &self.states
    }
}
