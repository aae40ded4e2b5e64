use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time;

/// Follow-up work that runs once the host has settled after an injection,
/// such as pressing Enter for auto-send. Tasks are never cancelled.
#[derive(Default)]
pub struct DeferredTasks {
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl DeferredTasks {
    pub async fn spawn_after<F>(&self, delay: Duration, label: &'static str, task: F)
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            time::sleep(delay).await;
            if let Err(err) = task.await {
                tracing::warn!(err = ?err, task = label, "Deferred sink task failed");
            }
        });

        let mut handles = self.handles.lock().await;
        handles.retain(|handle| return !handle.is_finished());
        handles.push(handle);
    }

    pub async fn settle(&self) {
        let handles = std::mem::take(&mut *self.handles.lock().await);
        for handle in handles {
            if let Err(err) = handle.await {
                tracing::warn!(err = ?err, "Deferred sink task panicked");
            }
        }
    }
}
