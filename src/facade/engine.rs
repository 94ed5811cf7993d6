use crate::batch::classify;
use crate::core::{Entity, PendingUpdate, Result};
use crate::engine::scheduler::DebounceScheduler;
use crate::engine::store::EntityStore;
use crate::engine::{CommitSink, EngineConfig, EngineShared};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

/// Optimistic batch update engine.
///
/// Accepts a stream of per-entity update requests, coalesces them into a
/// rolling pending set, commits them in debounced batches through the
/// caller's [`CommitSink`], and reconciles on the outcome: confirmed batches
/// become committed state, failed batches roll back to their pre-batch
/// values.
///
/// Submitted changes appear in [`current_view`](Self::current_view)
/// immediately; entities whose batch is in flight carry `locked = true`
/// until the sink resolves.
///
/// All mutation goes through [`submit_update`](Self::submit_update); the
/// engine owns the canonical entity state exclusively.
///
/// # Examples
///
/// ```
/// use optibatch::{Entity, PendingUpdate, UpdateEngine, sink_fn};
/// use futures::FutureExt;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> optibatch::Result<()> {
/// let photos = vec![
///     Entity::new("1").field("liked", false),
///     Entity::new("2").field("liked", false),
/// ];
/// let sink = sink_fn(|_batch| async { Ok(()) }.boxed());
///
/// let engine = UpdateEngine::new(photos, sink)?;
/// engine
///     .submit_update(vec![PendingUpdate::new("1").set("liked", true)])
///     .await?;
///
/// // The change is already visible; flush commits it without waiting for
/// // the debounce window.
/// engine.flush().await;
/// # Ok(())
/// # }
/// ```
pub struct UpdateEngine {
    shared: Arc<EngineShared>,
    scheduler: DebounceScheduler,
    view_rx: watch::Receiver<u64>,
}

impl std::fmt::Debug for UpdateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateEngine").finish_non_exhaustive()
    }
}

impl UpdateEngine {
    /// Create an engine with default timing (500ms quiet period, 2500ms
    /// commit ceiling).
    ///
    /// Must be called within a tokio runtime; the debounce worker is spawned
    /// here and aborted when the engine is dropped.
    ///
    /// # Errors
    /// Returns `InvalidIdentifier`/`DuplicateEntity` if the initial entity
    /// list has empty or repeated ids.
    pub fn new(entities: Vec<Entity>, sink: Arc<dyn CommitSink>) -> Result<Self> {
        Self::with_config(entities, sink, EngineConfig::default())
    }

    /// Create an engine with custom timing.
    ///
    /// # Errors
    /// As [`new`](Self::new), plus `InvalidConfig` for a bad configuration.
    pub fn with_config(
        entities: Vec<Entity>,
        sink: Arc<dyn CommitSink>,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;

        let store = EntityStore::new(entities)?;
        let (view_tx, view_rx) = watch::channel(0);

        let shared = Arc::new(EngineShared {
            store: RwLock::new(store),
            sink,
            view_tx,
        });
        let scheduler = DebounceScheduler::spawn(Arc::clone(&shared), &config);

        Ok(Self {
            shared,
            scheduler,
            view_rx,
        })
    }

    /// Submit a slice of per-entity updates.
    ///
    /// Each update is classified against the canonical state at call time:
    /// updates that revert an entity to its baseline cancel any pending
    /// patch for that id, real changes merge into the pending set. The
    /// debounce timer is then re-armed. Changes are visible in the current
    /// view immediately, before any commit fires.
    ///
    /// Submissions for an entity whose batch is in flight are accepted and
    /// join the next cycle; they never affect the outstanding batch.
    ///
    /// # Errors
    /// `InvalidIdentifier` or `UnknownEntity` reject the whole slice and
    /// leave the pending set untouched. Commit failures are never surfaced
    /// here; they show up as entities reverting in the current view.
    pub async fn submit_update(&self, updates: Vec<PendingUpdate>) -> Result<()> {
        {
            let mut store = self.shared.store.write().await;
            let classification = classify(&updates, store.entities())?;
            store.apply_classification(classification);
        }

        self.shared.mark_view_stale();
        self.scheduler.arm().await;
        Ok(())
    }

    /// The current view: committed entities overlaid with unflushed pending
    /// updates, `locked` set on entities owned by an unresolved batch.
    pub async fn current_view(&self) -> Vec<Entity> {
        self.shared.store.read().await.current_view()
    }

    /// Whether any accepted update is still waiting for the next batch.
    pub async fn has_pending_updates(&self) -> bool {
        self.shared.store.read().await.has_pending()
    }

    /// Subscribe to view staleness notifications.
    ///
    /// The channel carries a version counter bumped on every state change;
    /// await `changed()` on the receiver and recompute the projection.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.view_rx.clone()
    }

    /// Commit any pending updates immediately, bypassing the debounce
    /// window. Returns once the commit has resolved.
    pub async fn flush(&self) {
        self.scheduler.flush().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EngineError, Value};
    use crate::engine::sink_fn;
    use futures::FutureExt;
    use std::time::Duration;

    fn noop_sink() -> Arc<dyn CommitSink> {
        sink_fn(|_batch| async { Ok(()) }.boxed())
    }

    fn photos() -> Vec<Entity> {
        (1..=3)
            .map(|i| Entity::new(i.to_string()).field("liked", false))
            .collect()
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let config = EngineConfig::new().quiet_period(Duration::ZERO);
        let err = UpdateEngine::with_config(photos(), noop_sink(), config).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_duplicate_entities_rejected() {
        let entities = vec![Entity::new("1"), Entity::new("1")];
        let err = UpdateEngine::new(entities, noop_sink()).unwrap_err();
        assert_eq!(err, EngineError::DuplicateEntity("1".to_string()));
    }

    #[tokio::test]
    async fn test_submit_is_optimistic() {
        let engine = UpdateEngine::new(photos(), noop_sink()).unwrap();

        engine
            .submit_update(vec![PendingUpdate::new("2").set("liked", true)])
            .await
            .unwrap();

        let view = engine.current_view().await;
        let photo = view.iter().find(|e| e.id == "2").unwrap();
        assert_eq!(photo.get("liked"), Some(&Value::Boolean(true)));
        assert!(!photo.locked);
        assert!(engine.has_pending_updates().await);
    }

    #[tokio::test]
    async fn test_rejected_submission_leaves_pending_untouched() {
        let engine = UpdateEngine::new(photos(), noop_sink()).unwrap();

        let err = engine
            .submit_update(vec![
                PendingUpdate::new("1").set("liked", true),
                PendingUpdate::new("99").set("liked", true),
            ])
            .await
            .unwrap_err();

        assert_eq!(err, EngineError::UnknownEntity("99".to_string()));
        assert!(!engine.has_pending_updates().await);
    }

    #[tokio::test]
    async fn test_flush_commits_without_waiting() {
        let engine = UpdateEngine::new(photos(), noop_sink()).unwrap();

        engine
            .submit_update(vec![PendingUpdate::new("1").set("liked", true)])
            .await
            .unwrap();
        engine.flush().await;

        let view = engine.current_view().await;
        let photo = view.iter().find(|e| e.id == "1").unwrap();
        assert_eq!(photo.get("liked"), Some(&Value::Boolean(true)));
        assert!(!photo.locked);
        assert!(!engine.has_pending_updates().await);
    }

    #[tokio::test]
    async fn test_subscribe_sees_staleness() {
        let engine = UpdateEngine::new(photos(), noop_sink()).unwrap();
        let mut rx = engine.subscribe();
        let before = *rx.borrow_and_update();

        engine
            .submit_update(vec![PendingUpdate::new("1").set("liked", true)])
            .await
            .unwrap();

        rx.changed().await.unwrap();
        assert!(*rx.borrow() > before);
    }
}
