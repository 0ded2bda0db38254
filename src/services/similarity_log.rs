use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::cache::{CacheKey, KeyValueStore};
use crate::error::{AppError, AppResult};
use crate::models::UserId;

/// Retention for similarity log entries: 7 days
pub const LOG_TTL_SECS: u64 = 604_800;

/// One recommendation run, as recorded for offline tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityLogRecord {
    pub entry_id: Uuid,
    pub user_id: UserId,
    /// Candidates loaded from the store before any filtering
    pub candidates_considered: usize,
    /// Candidates that survived exclusion rules and were scored
    pub candidates_scored: usize,
    pub results_returned: usize,
    pub top_percentage: Option<u32>,
    pub limit: usize,
    pub min_similarity_percent: Option<u32>,
    pub elapsed_ms: u64,
    pub recorded_at: DateTime<Utc>,
}

/// Sender half of the similarity log
///
/// `record` hands the entry to a background task, so logging never adds
/// latency to a recommendation response.
#[derive(Clone)]
pub struct SimilarityLogger {
    write_tx: mpsc::UnboundedSender<SimilarityLogRecord>,
}

/// Handle for gracefully shutting down the log writer
pub struct SimilarityLogWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl SimilarityLogWriterHandle {
    /// Flushes queued records and stops the writer task
    ///
    /// Waits for the task to exit, so entries recorded before this call are
    /// in the store once it returns.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;

        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Similarity log writer task failed");
        }
    }
}

impl SimilarityLogger {
    /// Creates a logger and spawns its background writer task
    pub fn new(store: Arc<dyn KeyValueStore>) -> (Self, SimilarityLogWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let task = tokio::spawn(async move {
            log_writer_task(store, write_rx, shutdown_rx).await;
        });

        let logger = Self { write_tx };
        let handle = SimilarityLogWriterHandle { shutdown_tx, task };

        (logger, handle)
    }

    /// Queues a record for the background writer without blocking
    pub fn record(&self, record: SimilarityLogRecord) {
        if let Err(e) = self.write_tx.send(record) {
            tracing::error!(error = %e, "Failed to queue similarity log record");
        }
    }
}

/// Background task that persists log records
///
/// Receives records from the channel and writes them through the key-value
/// store. On shutdown it drains everything already queued before exiting.
async fn log_writer_task(
    store: Arc<dyn KeyValueStore>,
    mut write_rx: mpsc::UnboundedReceiver<SimilarityLogRecord>,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    tracing::debug!("Similarity log writer started");

    loop {
        tokio::select! {
            maybe_record = write_rx.recv() => {
                match maybe_record {
                    Some(record) => {
                        if let Err(e) = write_record(store.as_ref(), record).await {
                            tracing::error!(error = %e, "Failed to write similarity log record");
                        }
                    }
                    // All senders dropped
                    None => break,
                }
            }
            _ = shutdown_rx.recv() => {
                let mut flushed = 0;
                while let Ok(record) = write_rx.try_recv() {
                    if let Err(e) = write_record(store.as_ref(), record).await {
                        tracing::error!(error = %e, "Failed to flush similarity log record");
                    } else {
                        flushed += 1;
                    }
                }

                tracing::info!(flushed, "Similarity log writer stopped");
                break;
            }
        }
    }
}

async fn write_record(store: &dyn KeyValueStore, record: SimilarityLogRecord) -> AppResult<()> {
    let key = CacheKey::SimilarityLog {
        user_id: record.user_id,
        entry_id: record.entry_id,
    };

    let json = serde_json::to_string(&record)
        .map_err(|e| AppError::Internal(format!("Log serialization error: {}", e)))?;

    store.set(&key, json, LOG_TTL_SECS).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;

    fn sample_record(user_id: i64) -> SimilarityLogRecord {
        SimilarityLogRecord {
            entry_id: Uuid::new_v4(),
            user_id,
            candidates_considered: 5,
            candidates_scored: 4,
            results_returned: 3,
            top_percentage: Some(67),
            limit: 10,
            min_similarity_percent: None,
            elapsed_ms: 12,
            recorded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_records_are_flushed_on_shutdown() {
        let store = Arc::new(MemoryStore::new());
        let (logger, handle) = SimilarityLogger::new(store.clone());

        logger.record(sample_record(1));
        logger.record(sample_record(2));

        handle.shutdown().await;

        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_record_round_trips_through_store() {
        let store = Arc::new(MemoryStore::new());
        let (logger, handle) = SimilarityLogger::new(store.clone());

        let record = sample_record(7);
        let key = CacheKey::SimilarityLog {
            user_id: record.user_id,
            entry_id: record.entry_id,
        };

        logger.record(record.clone());
        handle.shutdown().await;

        let stored = store.get(&key).await.unwrap().expect("record was written");
        let parsed: SimilarityLogRecord = serde_json::from_str(&stored).unwrap();

        assert_eq!(parsed.entry_id, record.entry_id);
        assert_eq!(parsed.user_id, 7);
        assert_eq!(parsed.candidates_scored, 4);
    }

    #[tokio::test]
    async fn test_shutdown_with_nothing_queued() {
        let store = Arc::new(MemoryStore::new());
        let (_logger, handle) = SimilarityLogger::new(store.clone());

        handle.shutdown().await;

        assert!(store.is_empty().await);
    }
}
