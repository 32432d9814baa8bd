use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::interval;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;

use crate::NetworkError;
use crate::Result;

/// A cancellable repeating task.
///
/// The first run starts immediately, later runs follow at a fixed period.
/// Runs never overlap: a slow run delays the next one instead of piling up.
/// Cancellation is cooperative, it is observed between runs only, so a run
/// that already started is allowed to finish or fail on its own.
pub struct PeriodicTask {
    name: String,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    pub fn spawn<F, Fut>(
        name: &str,
        period: Duration,
        mut task_fn: F,
    ) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let task_name = name.to_string();

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => {
                        debug!("periodic task {task_name} stopped");
                        break;
                    }
                    _ = ticker.tick() => {}
                }
                task_fn().await;
            }
        });

        Self {
            name: name.to_string(),
            token,
            handle,
        }
    }

    /// Requests the task to stop. No new run starts after this call.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Waits until the task has exited, including a run that was in flight
    /// when `cancel` was called.
    pub async fn join(self) -> Result<()> {
        self.handle.await.map_err(|e| {
            error!("periodic task {} panicked: {:?}", self.name, e);
            NetworkError::TaskFailed(e).into()
        })
    }
}
