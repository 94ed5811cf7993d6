use crate::core::{PendingUpdate, Result};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;

/// The external commit function supplied by the surrounding service layer.
///
/// The engine treats a batch as all-or-nothing: `Ok` confirms every update
/// in the batch, any `Err` rolls the whole batch back locally. The sink owns
/// its own transport, latency and timeout concerns.
#[async_trait]
pub trait CommitSink: Send + Sync {
    async fn commit(&self, batch: Vec<PendingUpdate>) -> Result<()>;
}

struct FnSink<F>(F);

#[async_trait]
impl<F> CommitSink for FnSink<F>
where
    F: Fn(Vec<PendingUpdate>) -> BoxFuture<'static, Result<()>> + Send + Sync,
{
    async fn commit(&self, batch: Vec<PendingUpdate>) -> Result<()> {
        (self.0)(batch).await
    }
}

/// Wrap a plain async closure as a [`CommitSink`].
///
/// ```
/// use futures::FutureExt;
/// use optibatch::sink_fn;
///
/// let sink = sink_fn(|batch| {
///     async move {
///         println!("committing {} updates", batch.len());
///         Ok(())
///     }
///     .boxed()
/// });
/// ```
pub fn sink_fn<F>(f: F) -> Arc<dyn CommitSink>
where
    F: Fn(Vec<PendingUpdate>) -> BoxFuture<'static, Result<()>> + Send + Sync + 'static,
{
    Arc::new(FnSink(f))
}
