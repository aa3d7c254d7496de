//! Fire-and-forget click recording
//!
//! The redirect path hands clicks to [`ClickRecorder::dispatch`], which never
//! waits and never fails. A single background task drains the queue and
//! writes each click through the [`AnalyticsAggregator`]; failures there are
//! logged and dropped.

use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::analytics::aggregator::AnalyticsAggregator;
use crate::analytics::models::PendingClick;

enum RecorderMessage {
    Record(PendingClick),
    Shutdown,
}

struct RecorderWorker {
    receiver: mpsc::Receiver<RecorderMessage>,
    aggregator: Arc<AnalyticsAggregator>,
}

impl RecorderWorker {
    async fn run(mut self) {
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                RecorderMessage::Record(click) => self.record(click).await,
                RecorderMessage::Shutdown => {
                    info!("Click recorder received shutdown signal, draining queue...");
                    self.receiver.close();
                    while let Some(RecorderMessage::Record(click)) = self.receiver.recv().await {
                        self.record(click).await;
                    }
                    break;
                }
            }
        }
        info!("Click recorder stopped");
    }

    async fn record(&self, click: PendingClick) {
        let short_code = click.short_code.clone();
        if let Err(err) = self.aggregator.record_click(click).await {
            warn!(short_code = %short_code, error = %err, "failed to record click");
        }
    }
}

pub struct ClickRecorder {
    sender: mpsc::Sender<RecorderMessage>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ClickRecorder {
    /// Spawn the background worker with a queue of `queue_size` clicks.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(aggregator: Arc<AnalyticsAggregator>, queue_size: usize) -> Self {
        let (sender, receiver) = mpsc::channel(queue_size.max(1));

        let worker = RecorderWorker {
            receiver,
            aggregator,
        };
        let handle = tokio::spawn(worker.run());

        Self {
            sender,
            worker: Mutex::new(Some(handle)),
        }
    }

    /// Queue a click without waiting. When the queue is full or the worker
    /// has stopped, the click is dropped with a warning.
    pub fn dispatch(&self, click: PendingClick) {
        let short_code = click.short_code.clone();
        match self.sender.try_send(RecorderMessage::Record(click)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(short_code = %short_code, "click queue full, dropping click");
            }
            Err(TrySendError::Closed(_)) => {
                warn!(short_code = %short_code, "click recorder stopped, dropping click");
            }
        }
    }

    /// Stop accepting clicks, record everything already queued, and wait for
    /// the worker to finish. Later calls return immediately.
    pub async fn shutdown(&self) {
        let Some(handle) = self.worker.lock().await.take() else {
            return;
        };

        let _ = self.sender.send(RecorderMessage::Shutdown).await;
        if let Err(err) = handle.await {
            warn!(error = %err, "click recorder task ended abnormally");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{SqliteStorage, Storage};
    use std::time::Duration;

    async fn setup() -> (Arc<dyn Storage>, Arc<AnalyticsAggregator>) {
        let storage = SqliteStorage::new("sqlite::memory:", 5).await.unwrap();
        storage.init().await.unwrap();
        let storage: Arc<dyn Storage> = Arc::new(storage);
        let aggregator = Arc::new(AnalyticsAggregator::new(Arc::clone(&storage)));
        (storage, aggregator)
    }

    fn click(code: &str) -> PendingClick {
        PendingClick {
            short_code: code.to_string(),
            ip_address: "198.51.100.4".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            referer: Some("https://news.example.com".to_string()),
        }
    }

    #[tokio::test]
    async fn test_shutdown_drains_queue() {
        let (storage, aggregator) = setup().await;
        let recorder = ClickRecorder::spawn(aggregator, 100);

        for _ in 0..25 {
            recorder.dispatch(click("queued"));
        }
        recorder.shutdown().await;

        assert_eq!(storage.count_clicks("queued").await.unwrap(), 25);
    }

    #[tokio::test]
    async fn test_dispatch_after_shutdown_is_dropped() {
        let (storage, aggregator) = setup().await;
        let recorder = ClickRecorder::spawn(aggregator, 10);

        recorder.shutdown().await;
        recorder.dispatch(click("late"));
        recorder.shutdown().await;

        assert_eq!(storage.count_clicks("late").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_is_swallowed() {
        let (storage, aggregator) = setup().await;
        let recorder = ClickRecorder::spawn(aggregator, 10);

        // Closing the pool makes every insert fail
        storage.close().await;
        recorder.dispatch(click("broken"));
        recorder.dispatch(click("broken"));

        // The worker survives the failures and still drains and exits
        tokio::time::timeout(Duration::from_secs(5), recorder.shutdown())
            .await
            .expect("shutdown should complete after failed inserts");
        assert!(recorder.worker.lock().await.is_none());

        // A stopped recorder drops clicks without blocking the caller
        tokio::time::timeout(Duration::from_secs(1), async {
            for _ in 0..20 {
                recorder.dispatch(click("broken"));
            }
        })
        .await
        .expect("dispatch should never block");
        assert!(recorder.sender.is_closed());
    }
}
