use super::coalescer::Classification;
use crate::core::{EntityId, PendingUpdate};
use std::collections::HashMap;

/// The rolling set of accepted, unflushed updates, keyed by entity id.
///
/// Owned exclusively by the engine and mutated synchronously under the store
/// lock; at most one entry exists per id.
#[derive(Debug, Default)]
pub struct PendingSet {
    updates: HashMap<EntityId, PendingUpdate>,
}

impl PendingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a classification outcome as a single atomic mutation:
    /// no-op ids are removed, real changes overwrite or insert.
    pub fn apply(&mut self, classification: Classification) {
        for id in &classification.to_drop {
            self.updates.remove(id);
        }
        for (id, update) in classification.to_merge {
            self.updates.insert(id, update);
        }
    }

    /// Take the whole set, leaving it empty. Subsequent submissions start a
    /// fresh, independent set.
    pub fn drain(&mut self) -> HashMap<EntityId, PendingUpdate> {
        std::mem::take(&mut self.updates)
    }

    pub fn get(&self, id: &str) -> Option<&PendingUpdate> {
        self.updates.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.updates.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}
