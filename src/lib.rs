// ============================================================================
// optibatch Library
// ============================================================================
//
// Optimistic batch update engine: client-initiated mutations appear in the
// local view instantly, are coalesced against a rolling pending set, and
// are committed in debounced batches through a caller-supplied sink. A
// confirmed batch becomes committed state; a failed batch rolls back to its
// pre-batch values.
//
// ============================================================================

pub mod batch;
pub mod core;
pub mod engine;
pub mod facade;

// Re-export main types for convenience
pub use crate::core::{EngineError, Entity, EntityId, Fields, PendingUpdate, Result, Value};
pub use engine::{
    sink_fn, CommitSink, EngineConfig, DEFAULT_MAX_WAIT_MS, DEFAULT_QUIET_PERIOD_MS,
};
pub use facade::UpdateEngine;
