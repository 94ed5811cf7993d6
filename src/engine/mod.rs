// ============================================================================
// Engine Module
// ============================================================================
//
// The moving parts behind the facade:
// - Entity store: canonical state, pending overlay, lock bookkeeping
// - Debounced scheduler: quiet-period timer with a commit ceiling
// - Committer: drain, lock, call the external sink, reconcile
// - Commit sink: the async seam to the caller's persistence/transport
//
// ============================================================================

pub mod committer;
pub mod config;
pub mod scheduler;
pub mod sink;
pub mod store;

pub use config::{EngineConfig, DEFAULT_MAX_WAIT_MS, DEFAULT_QUIET_PERIOD_MS};
pub use sink::{sink_fn, CommitSink};
pub use store::EntityStore;

use std::sync::Arc;
use tokio::sync::{watch, RwLock};

/// State shared between the facade, the scheduler worker and in-flight
/// commit tasks.
pub(crate) struct EngineShared {
    pub(crate) store: RwLock<EntityStore>,
    pub(crate) sink: Arc<dyn CommitSink>,
    pub(crate) view_tx: watch::Sender<u64>,
}

impl EngineShared {
    /// Tell subscribed projections that the current view is stale.
    pub(crate) fn mark_view_stale(&self) {
        self.view_tx.send_modify(|version| *version = version.wrapping_add(1));
    }
}
