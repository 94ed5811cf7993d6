// ============================================================================
// Batch Classification Module
// ============================================================================
//
// Turns raw per-entity update submissions into the rolling pending set that
// feeds debounced commits:
// - Equality filter: does a proposed patch change anything observable?
// - Coalescer: partition a submission slice into cancellations and merges
// - Pending set: at most one merged patch per id, drained atomically
//
// ============================================================================

pub mod coalescer;
pub mod filter;
pub mod pending;

pub use coalescer::{classify, Classification};
pub use filter::is_change_meaningful;
pub use pending::PendingSet;
