//! Shutdown coordination for the engine's background schedulers.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that all long-running scheduler tasks
/// subscribe to.
pub struct Shutdown {
    /// Broadcast channel sender.
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Named scheduler tasks with a bounded join.
///
/// In-flight blocking work (a timed-out check still running on the blocking
/// pool) is not cancellable; the deadline bounds how long `stop()` waits for
/// the current tick before abandoning a task.
#[derive(Default)]
pub struct TaskSet {
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl TaskSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a spawned scheduler task under a name for shutdown logging.
    pub fn spawn<F>(&mut self, name: &'static str, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        self.handles.push((name, tokio::spawn(future)));
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every task to exit, bounded per task by `deadline`.
    ///
    /// Tasks that outlive the deadline are aborted so shutdown stays bounded.
    pub async fn join_all(&mut self, deadline: Duration) {
        for (name, mut handle) in self.handles.drain(..) {
            match tokio::time::timeout(deadline, &mut handle).await {
                Ok(Ok(())) => {
                    tracing::debug!(task = name, "Scheduler task exited");
                }
                Ok(Err(e)) => {
                    tracing::error!(task = name, error = %e, "Scheduler task panicked");
                }
                Err(_) => {
                    tracing::warn!(
                        task = name,
                        deadline_ms = deadline.as_millis() as u64,
                        "Scheduler task did not exit before deadline, aborting"
                    );
                    handle.abort();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tasks_exit_on_shutdown_signal() {
        let shutdown = Shutdown::new();
        let mut tasks = TaskSet::new();

        let mut rx = shutdown.subscribe();
        tasks.spawn("listener", async move {
            let _ = rx.recv().await;
        });

        shutdown.trigger();
        tasks.join_all(Duration::from_secs(1)).await;
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn stuck_task_is_aborted_at_deadline() {
        let mut tasks = TaskSet::new();
        tasks.spawn("stuck", async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        });

        // Must return promptly rather than waiting an hour.
        tasks.join_all(Duration::from_millis(50)).await;
        assert!(tasks.is_empty());
    }
}
