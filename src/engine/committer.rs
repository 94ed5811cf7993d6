use super::EngineShared;
use std::sync::Arc;
use tracing::{debug, warn};

/// Run one commit cycle: drain the pending set, lock the affected entities,
/// hand the batch to the external sink and reconcile on its outcome.
///
/// Invoked by the scheduler when a debounce window closes, and by `flush`.
/// A commit failure is absorbed here: the batch is rolled back to its
/// pre-apply snapshot and the error never propagates further.
pub(crate) async fn run(shared: Arc<EngineShared>) {
    let job = {
        let mut store = shared.store.write().await;
        store.drain_for_commit()
    };

    // Empty pending set at fire time: the whole cycle was coalesced away.
    let Some(job) = job else {
        return;
    };

    shared.mark_view_stale();
    debug!(batch_size = job.updates.len(), "batch drained, commit in flight");

    // The store lock is not held across this await: submissions keep landing
    // in the next cycle's pending set while the sink call is outstanding.
    let outcome = shared.sink.commit(job.updates.clone()).await;

    {
        let mut store = shared.store.write().await;
        match outcome {
            Ok(()) => {
                debug!(batch_size = job.updates.len(), "batch committed");
                store.resolve_success(&job);
            }
            Err(error) => {
                warn!(%error, batch_size = job.updates.len(), "commit failed, reverting batch");
                store.resolve_failure(job);
            }
        }
    }

    shared.mark_view_stale();
}
