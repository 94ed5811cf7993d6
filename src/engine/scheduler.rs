use super::committer;
use super::config::EngineConfig;
use super::EngineShared;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

/// Deadlines of the currently armed commit cycle.
///
/// `quiet` moves forward on every submission; `ceiling` is fixed when the
/// cycle opens, so a steady stream of edits cannot starve the commit.
struct CycleDeadlines {
    quiet: Instant,
    ceiling: Instant,
}

impl CycleDeadlines {
    fn next_fire(&self) -> Instant {
        self.quiet.min(self.ceiling)
    }
}

/// Debounce timer driving the committer.
///
/// One long-lived worker task waits on the earlier of the two deadlines.
/// Firing clears the cycle first and runs the committer on a fresh task, so
/// a new cycle can be armed while the previous batch is still in flight.
pub(crate) struct DebounceScheduler {
    shared: Arc<EngineShared>,
    cycle: Arc<Mutex<Option<CycleDeadlines>>>,
    notify: Arc<Notify>,
    quiet_period: Duration,
    max_wait: Duration,
    worker: JoinHandle<()>,
}

impl DebounceScheduler {
    pub(crate) fn spawn(shared: Arc<EngineShared>, config: &EngineConfig) -> Self {
        let cycle: Arc<Mutex<Option<CycleDeadlines>>> = Arc::new(Mutex::new(None));
        let notify = Arc::new(Notify::new());

        let worker = tokio::spawn(run_timer(
            Arc::clone(&shared),
            Arc::clone(&cycle),
            Arc::clone(&notify),
        ));

        Self {
            shared,
            cycle,
            notify,
            quiet_period: config.quiet_period,
            max_wait: config.max_wait,
            worker,
        }
    }

    /// Refresh the quiet countdown, opening a new cycle if none is armed.
    /// Called once per submission, after the pending set mutation.
    pub(crate) async fn arm(&self) {
        let now = Instant::now();
        {
            let mut cycle = self.cycle.lock().await;
            match cycle.as_mut() {
                Some(deadlines) => {
                    deadlines.quiet = now + self.quiet_period;
                }
                None => {
                    *cycle = Some(CycleDeadlines {
                        quiet: now + self.quiet_period,
                        ceiling: now + self.max_wait,
                    });
                }
            }
        }
        self.notify.notify_one();
    }

    /// Cancel any armed cycle and commit whatever is pending right now.
    /// Returns once the commit has resolved.
    pub(crate) async fn flush(&self) {
        {
            let mut cycle = self.cycle.lock().await;
            *cycle = None;
        }
        self.notify.notify_one();
        committer::run(Arc::clone(&self.shared)).await;
    }
}

impl Drop for DebounceScheduler {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

async fn run_timer(
    shared: Arc<EngineShared>,
    cycle: Arc<Mutex<Option<CycleDeadlines>>>,
    notify: Arc<Notify>,
) {
    loop {
        let deadline = cycle.lock().await.as_ref().map(CycleDeadlines::next_fire);

        match deadline {
            None => notify.notified().await,
            Some(deadline) if Instant::now() >= deadline => {
                *cycle.lock().await = None;
                // The committer gets its own task so this loop can accept a
                // fresh cycle while the batch is still in flight.
                tokio::spawn(committer::run(Arc::clone(&shared)));
            }
            Some(deadline) => {
                tokio::select! {
                    _ = sleep_until(deadline) => {}
                    _ = notify.notified() => {}
                }
            }
        }
    }
}
