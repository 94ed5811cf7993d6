use super::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type EntityId = String;
pub type Fields = BTreeMap<String, Value>;

/// Field name carrying the in-flight marker on projected entities.
pub const LOCKED_FLAG_KEY: &str = "locked";

/// Legacy alias for the in-flight marker, still excluded from comparisons.
pub const PENDING_FLAG_KEY: &str = "pending";

const ID_KEY: &str = "id";

/// Keys that are identity or transient markers, never domain data.
pub(crate) fn is_reserved_key(key: &str) -> bool {
    key == ID_KEY || key == LOCKED_FLAG_KEY || key == PENDING_FLAG_KEY
}

/// A uniquely identified record subject to optimistic updates.
///
/// The store holds one canonical copy per id. `locked` marks the entity as
/// part of an in-flight, unresolved batch; it is a derived flag and never
/// takes part in equality comparisons or serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,

    #[serde(default)]
    pub fields: Fields,

    #[serde(skip)]
    pub locked: bool,
}

// `locked` is transient and excluded from equality.
impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.fields == other.fields
    }
}

impl Eq for Entity {}

impl Entity {
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            fields: Fields::new(),
            locked: false,
        }
    }

    /// Set a field value (builder style).
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Overwrite this entity's fields with the patch carried by `update`.
    pub(crate) fn apply_patch(&mut self, update: &PendingUpdate) {
        for (key, value) in &update.fields {
            if is_reserved_key(key) {
                continue;
            }
            self.fields.insert(key.clone(), value.clone());
        }
    }
}

/// An unflushed, accepted patch to one entity.
///
/// At most one pending update exists per id at any time; later submissions
/// for the same id replace the stored patch. Once coalesced, stored patches
/// carry the full field set of the entity they were merged onto.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingUpdate {
    pub id: EntityId,

    #[serde(default)]
    pub fields: Fields,
}

impl PendingUpdate {
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            fields: Fields::new(),
        }
    }

    /// Set a patched field value (builder style).
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Expand this patch to a full-field patch against `entity`: the entity's
    /// current fields overlaid with the patched ones. Reserved keys are
    /// dropped from the result.
    pub(crate) fn merged_onto(&self, entity: &Entity) -> PendingUpdate {
        let mut fields = entity.fields.clone();
        for (key, value) in &self.fields {
            if is_reserved_key(key) {
                continue;
            }
            fields.insert(key.clone(), value.clone());
        }
        PendingUpdate {
            id: self.id.clone(),
            fields,
        }
    }
}
