use super::filter::is_change_meaningful;
use crate::core::{EngineError, Entity, EntityId, PendingUpdate, Result};
use std::collections::HashMap;

/// Outcome of classifying one submission slice against a snapshot.
///
/// `to_drop` lists ids whose updates turned out to be no-ops relative to the
/// snapshot; any stored pending update for them must be cancelled.
/// `to_merge` holds full-field patches to insert or overwrite.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Classification {
    pub to_drop: Vec<EntityId>,
    pub to_merge: HashMap<EntityId, PendingUpdate>,
}

impl Classification {
    pub fn is_empty(&self) -> bool {
        self.to_drop.is_empty() && self.to_merge.is_empty()
    }
}

/// Classify each incoming update as a real change or a revert-to-baseline.
///
/// The snapshot is the canonical entity state at submission time. It is
/// passed explicitly on every call so classification always runs against the
/// current baseline, never against captured stale state.
///
/// Classification is pure: on any error the caller's pending set must be
/// left untouched, so everything is validated before anything is returned.
///
/// # Errors
/// - `InvalidIdentifier` for empty or mismatched ids
/// - `UnknownEntity` for an update whose id is not in the snapshot
pub fn classify(updates: &[PendingUpdate], snapshot: &[Entity]) -> Result<Classification> {
    let lookup: HashMap<&str, &Entity> = snapshot
        .iter()
        .map(|entity| (entity.id.as_str(), entity))
        .collect();

    let mut classification = Classification::default();

    for update in updates {
        if update.id.is_empty() {
            return Err(EngineError::InvalidIdentifier(
                "entity id must be a non-empty string".to_string(),
            ));
        }

        let entity = lookup
            .get(update.id.as_str())
            .ok_or_else(|| EngineError::UnknownEntity(update.id.clone()))?;

        if is_change_meaningful(entity, update)? {
            // A later update for the same id within this slice wins.
            classification.to_drop.retain(|id| id != &update.id);
            classification
                .to_merge
                .insert(update.id.clone(), update.merged_onto(entity));
        } else {
            classification.to_merge.remove(&update.id);
            if !classification.to_drop.contains(&update.id) {
                classification.to_drop.push(update.id.clone());
            }
        }
    }

    Ok(classification)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;

    fn snapshot() -> Vec<Entity> {
        (1..=3)
            .map(|i| {
                Entity::new(i.to_string())
                    .field("title", format!("Photo #{}", i))
                    .field("liked", false)
            })
            .collect()
    }

    #[test]
    fn test_real_change_lands_in_to_merge() {
        let updates = vec![PendingUpdate::new("1").set("liked", true)];

        let classification = classify(&updates, &snapshot()).unwrap();
        assert!(classification.to_drop.is_empty());
        assert_eq!(classification.to_merge.len(), 1);

        let merged = &classification.to_merge["1"];
        assert_eq!(merged.get("liked"), Some(&Value::Boolean(true)));
        // Full-field patch: untouched fields travel along.
        assert_eq!(merged.get("title"), Some(&Value::Text("Photo #1".into())));
    }

    #[test]
    fn test_no_op_lands_in_to_drop() {
        let updates = vec![PendingUpdate::new("2").set("liked", false)];

        let classification = classify(&updates, &snapshot()).unwrap();
        assert_eq!(classification.to_drop, vec!["2".to_string()]);
        assert!(classification.to_merge.is_empty());
    }

    #[test]
    fn test_mixed_slice_is_partitioned() {
        let updates = vec![
            PendingUpdate::new("1").set("liked", true),
            PendingUpdate::new("2").set("liked", false),
            PendingUpdate::new("3").set("liked", true),
        ];

        let classification = classify(&updates, &snapshot()).unwrap();
        assert_eq!(classification.to_drop, vec!["2".to_string()]);
        assert_eq!(classification.to_merge.len(), 2);
        assert!(classification.to_merge.contains_key("1"));
        assert!(classification.to_merge.contains_key("3"));
    }

    #[test]
    fn test_later_update_for_same_id_wins() {
        let updates = vec![
            PendingUpdate::new("1").set("liked", true),
            PendingUpdate::new("1").set("liked", false),
        ];

        let classification = classify(&updates, &snapshot()).unwrap();
        assert_eq!(classification.to_drop, vec!["1".to_string()]);
        assert!(classification.to_merge.is_empty());

        let reversed = vec![
            PendingUpdate::new("1").set("liked", false),
            PendingUpdate::new("1").set("liked", true),
        ];

        let classification = classify(&reversed, &snapshot()).unwrap();
        assert!(classification.to_drop.is_empty());
        assert_eq!(
            classification.to_merge["1"].get("liked"),
            Some(&Value::Boolean(true))
        );
    }

    #[test]
    fn test_unknown_id_is_rejected() {
        let updates = vec![PendingUpdate::new("99").set("liked", true)];

        let err = classify(&updates, &snapshot()).unwrap_err();
        assert_eq!(err, EngineError::UnknownEntity("99".to_string()));
    }

    #[test]
    fn test_empty_id_is_rejected_before_lookup() {
        let updates = vec![PendingUpdate::new("").set("liked", true)];

        let err = classify(&updates, &snapshot()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidIdentifier(_)));
    }

    #[test]
    fn test_error_poisons_whole_slice() {
        let updates = vec![
            PendingUpdate::new("1").set("liked", true),
            PendingUpdate::new("99").set("liked", true),
        ];

        assert!(classify(&updates, &snapshot()).is_err());
    }

    #[test]
    fn test_empty_slice_classifies_to_nothing() {
        let classification = classify(&[], &snapshot()).unwrap();
        assert!(classification.is_empty());
    }
}
