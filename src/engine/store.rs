use crate::batch::{Classification, PendingSet};
use crate::core::{EngineError, Entity, EntityId, PendingUpdate, Result};
use std::collections::HashMap;

/// A batch drained from the pending set, plus everything needed to resolve
/// it independently of any other in-flight batch.
///
/// `prior` snapshots each affected entity as it was immediately before this
/// batch's patch was applied; a failed commit restores exactly that state.
#[derive(Debug)]
pub(crate) struct BatchJob {
    pub(crate) updates: Vec<PendingUpdate>,
    pub(crate) prior: HashMap<EntityId, Entity>,
}

/// Canonical entity state plus the pending overlay.
///
/// The store owns the one true copy of every entity. Committed values live
/// in `entities`; unflushed optimistic values live in `pending`; `inflight`
/// counts how many unresolved batches currently own each id, which is what
/// drives the `locked` flag when several cycles overlap.
#[derive(Debug)]
pub struct EntityStore {
    entities: Vec<Entity>,
    index: HashMap<EntityId, usize>,
    pending: PendingSet,
    inflight: HashMap<EntityId, u32>,
}

impl EntityStore {
    /// Build the store from the caller's initial entity list.
    ///
    /// # Errors
    /// - `InvalidIdentifier` for an empty id
    /// - `DuplicateEntity` for a repeated id
    pub fn new(initial: Vec<Entity>) -> Result<Self> {
        let mut entities = Vec::with_capacity(initial.len());
        let mut index = HashMap::with_capacity(initial.len());

        for mut entity in initial {
            if entity.id.is_empty() {
                return Err(EngineError::InvalidIdentifier(
                    "entity id must be a non-empty string".to_string(),
                ));
            }
            if index.contains_key(&entity.id) {
                return Err(EngineError::DuplicateEntity(entity.id));
            }

            entity.locked = false;
            index.insert(entity.id.clone(), entities.len());
            entities.push(entity);
        }

        Ok(Self {
            entities,
            index,
            pending: PendingSet::new(),
            inflight: HashMap::new(),
        })
    }

    /// Canonical entities: committed values plus any in-flight batch's
    /// applied values. This is the comparison baseline for classification.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Merge a classification outcome into the pending set atomically.
    pub fn apply_classification(&mut self, classification: Classification) {
        self.pending.apply(classification);
    }

    /// Drain the pending set into a batch: snapshot pre-state, apply each
    /// patch optimistically and mark the entity locked.
    ///
    /// Returns `None` when there is nothing to commit. The batch is ordered
    /// by the store's canonical entity order.
    pub(crate) fn drain_for_commit(&mut self) -> Option<BatchJob> {
        if self.pending.is_empty() {
            return None;
        }

        let mut drained = self.pending.drain();
        let mut updates = Vec::with_capacity(drained.len());
        let mut prior = HashMap::with_capacity(drained.len());

        for entity in &mut self.entities {
            let Some(update) = drained.remove(&entity.id) else {
                continue;
            };

            prior.insert(entity.id.clone(), entity.clone());
            entity.apply_patch(&update);
            entity.locked = true;
            *self.inflight.entry(entity.id.clone()).or_insert(0) += 1;
            updates.push(update);
        }

        Some(BatchJob { updates, prior })
    }

    /// Confirm a batch. Its fields were already applied at drain time and
    /// are not re-applied here, so a later in-flight batch that overwrote
    /// the same entity keeps winning. Each entity unlocks once no other
    /// batch still owns it.
    pub(crate) fn resolve_success(&mut self, job: &BatchJob) {
        for update in &job.updates {
            let Some(&position) = self.index.get(&update.id) else {
                continue;
            };
            let still_owned = self.release_inflight(&update.id);
            self.entities[position].locked = still_owned;
        }
    }

    /// Roll a failed batch back to the pre-apply snapshot captured at drain
    /// time. Entities owned by another in-flight batch stay locked.
    pub(crate) fn resolve_failure(&mut self, job: BatchJob) {
        for (id, prior) in job.prior {
            let Some(&position) = self.index.get(&id) else {
                continue;
            };
            let still_owned = self.release_inflight(&id);
            let entity = &mut self.entities[position];
            entity.fields = prior.fields;
            entity.locked = still_owned;
        }
    }

    /// Decrement the in-flight count for `id`; returns whether the entity is
    /// still owned by an unresolved batch.
    fn release_inflight(&mut self, id: &str) -> bool {
        match self.inflight.get_mut(id) {
            Some(count) if *count > 1 => {
                *count -= 1;
                true
            }
            Some(_) => {
                self.inflight.remove(id);
                false
            }
            None => false,
        }
    }

    /// Project the current view: canonical entities overlaid with any
    /// outstanding pending patch. The `locked` flag always reflects batch
    /// ownership, never the overlay.
    pub fn current_view(&self) -> Vec<Entity> {
        self.entities
            .iter()
            .map(|entity| {
                let mut projected = entity.clone();
                if let Some(update) = self.pending.get(&entity.id) {
                    projected.apply_patch(update);
                }
                projected
            })
            .collect()
    }
}
