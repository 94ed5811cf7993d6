use crate::core::types::is_reserved_key;
use crate::core::{EngineError, Entity, PendingUpdate, Result};

/// Decide whether `update` actually changes observable fields of `original`.
///
/// Only the fields present on the update are compared, excluding the id and
/// transient flags. Ids must be non-empty and must match; anything else is a
/// contract violation reported as `InvalidIdentifier` rather than coerced.
///
/// # Errors
/// Returns `InvalidIdentifier` if either id is empty or the ids differ.
pub fn is_change_meaningful(original: &Entity, update: &PendingUpdate) -> Result<bool> {
    if original.id.is_empty() || update.id.is_empty() {
        return Err(EngineError::InvalidIdentifier(
            "entity id must be a non-empty string".to_string(),
        ));
    }

    if original.id != update.id {
        return Err(EngineError::InvalidIdentifier(format!(
            "id mismatch: entity '{}' vs update '{}'",
            original.id, update.id
        )));
    }

    for (key, value) in &update.fields {
        if is_reserved_key(key) {
            continue;
        }
        if original.fields.get(key) != Some(value) {
            return Ok(true);
        }
    }

    Ok(false)
}
