//! Static pin-to-source bindings
//!
//! Built once from configuration and read-only afterwards. The binding set
//! is the keyspace for both the activity store and the projector: source
//! names outside it are dropped everywhere.

use std::collections::HashMap;

use crate::config::Assignment;

/// Immutable mapping between GPIO pins and OBS source names.
///
/// Each source name maps to exactly one pin; a source repeated in
/// configuration keeps its last assignment. Two sources may share a pin, in
/// which case the pin lights while either of them is active.
#[derive(Debug, Clone)]
pub struct SourceBindings {
    pins: HashMap<String, u8>,
    /// Source names in configuration order, deduplicated
    names: Vec<String>,
}

impl SourceBindings {
    pub fn new(assigns: &[Assignment]) -> Self {
        let mut pins = HashMap::new();
        let mut names = Vec::new();
        for assign in assigns {
            if pins.insert(assign.source.clone(), assign.pin).is_none() {
                names.push(assign.source.clone());
            }
        }
        Self { pins, names }
    }

    /// All bound source names, in configuration order.
    pub fn source_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// The pin a source is bound to, or `None` for unbound names.
    /// Callers treat `None` as "not ours", never as an error.
    pub fn pin_for(&self, source: &str) -> Option<u8> {
        self.pins.get(source).copied()
    }

    pub fn contains(&self, source: &str) -> bool {
        self.pins.contains_key(source)
    }

    /// All bound pins, deduplicated and sorted.
    pub fn pins(&self) -> Vec<u8> {
        let mut pins: Vec<u8> = self.pins.values().copied().collect();
        pins.sort_unstable();
        pins.dedup();
        pins
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}
