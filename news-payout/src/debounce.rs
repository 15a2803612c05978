use crate::types::QueryParameters;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Handle to a future scheduled after a delay. Cancelled on drop.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Run `task` once `delay` has elapsed, unless the returned handle is
/// cancelled first.
pub fn schedule<F>(delay: Duration, task: F) -> ScheduledTask
where
    F: Future<Output = ()> + Send + 'static,
{
    let deadline = tokio::time::Instant::now() + delay;
    let handle = tokio::spawn(async move {
        tokio::time::sleep_until(deadline).await;
        task.await;
    });
    ScheduledTask { handle }
}

/// Trailing-edge debouncer for search parameters.
///
/// Each `push` replaces whatever was pending and restarts the quiet
/// window. When a window elapses untouched, the newest parameters are sent
/// on the trigger channel. The debouncer does no fetching itself.
pub struct QueryDebouncer {
    delay: Duration,
    pending: Option<ScheduledTask>,
    trigger_tx: mpsc::UnboundedSender<QueryParameters>,
}

impl QueryDebouncer {
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<QueryParameters>) {
        let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
        let debouncer = Self {
            delay,
            pending: None,
            trigger_tx,
        };
        (debouncer, trigger_rx)
    }

    pub fn push(&mut self, params: QueryParameters) {
        if let Some(previous) = self.pending.take() {
            previous.cancel();
        }

        debug!("Debouncing query {:?} for {:?}", params.query, self.delay);
        let tx = self.trigger_tx.clone();
        self.pending = Some(schedule(self.delay, async move {
            // Receiver gone means the consumer was torn down.
            let _ = tx.send(params);
        }));
    }

    pub fn has_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Drop any pending trigger without firing it.
    pub fn cancel(&mut self) {
        if let Some(task) = self.pending.take() {
            task.cancel();
            debug!("Cancelled pending query trigger");
        }
    }
}

impl Drop for QueryDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
