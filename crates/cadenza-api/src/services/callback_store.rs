//! In-memory record of the latest provider callback per task.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use cadenza_core::CallbackRecord;
use chrono::Utc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Shared, cloneable handle to the callback records.
///
/// Records are replaced whole under the write lock, so a concurrent reader
/// sees either the previous record or the new one.
#[derive(Clone, Default)]
pub struct CallbackStore {
    records: Arc<RwLock<HashMap<String, CallbackRecord>>>,
}

impl CallbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record, returning the one it replaced.
    pub async fn record(&self, task_id: &str, record: CallbackRecord) -> Option<CallbackRecord> {
        self.records
            .write()
            .await
            .insert(task_id.to_string(), record)
    }

    pub async fn get(&self, task_id: &str) -> Option<CallbackRecord> {
        self.records.read().await.get(task_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Drop records received more than `max_age` ago. Returns how many were removed.
    pub async fn prune_older_than(&self, max_age: Duration) -> usize {
        let Ok(max_age) = chrono::Duration::from_std(max_age) else {
            return 0;
        };
        let cutoff = Utc::now() - max_age;

        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| record.received_at >= cutoff);
        before - records.len()
    }
}

impl std::fmt::Debug for CallbackStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackStore").finish_non_exhaustive()
    }
}

/// Periodically prune records older than `retention`.
pub fn spawn_retention_task(store: CallbackStore, retention: Duration) -> JoinHandle<()> {
    let period = (retention / 4).clamp(Duration::from_secs(1), Duration::from_secs(300));
    tracing::info!(
        retention_secs = retention.as_secs(),
        sweep_interval_secs = period.as_secs(),
        "Callback retention enabled"
    );

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let removed = store.prune_older_than(retention).await;
            if removed > 0 {
                tracing::debug!(removed, "Pruned expired callback records");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadenza_core::CallbackType;
    use serde_json::json;

    fn record(kind: &str, age_secs: i64) -> CallbackRecord {
        CallbackRecord {
            code: Some(200),
            message: Some("ok".to_string()),
            callback_type: CallbackType::parse(Some(kind)),
            payload: json!([{"audio_url": "https://cdn/x.mp3"}]),
            received_at: Utc::now() - chrono::Duration::seconds(age_secs),
        }
    }

    #[tokio::test]
    async fn later_record_overwrites_earlier() {
        let store = CallbackStore::new();
        assert!(store.record("t1", record("first", 0)).await.is_none());
        let previous = store.record("t1", record("complete", 0)).await;
        assert_eq!(previous.unwrap().callback_type, CallbackType::Other(Some("first".into())));
        assert_eq!(store.get("t1").await.unwrap().callback_type, CallbackType::Complete);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn missing_task_returns_none() {
        let store = CallbackStore::new();
        assert!(store.get("nope").await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn prune_removes_only_old_records() {
        let store = CallbackStore::new();
        store.record("old", record("complete", 3600)).await;
        store.record("new", record("complete", 1)).await;

        let removed = store.prune_older_than(Duration::from_secs(600)).await;
        assert_eq!(removed, 1);
        assert!(store.get("old").await.is_none());
        assert!(store.get("new").await.is_some());
    }

    #[tokio::test]
    async fn concurrent_writes_to_distinct_tasks_do_not_interfere() {
        let store = CallbackStore::new();
        let mut handles = Vec::new();
        for i in 0..64 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                for round in 0..10 {
                    let mut rec = record("complete", 0);
                    rec.code = Some(i * 100 + round);
                    store.record(&format!("task-{}", i), rec).await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.len().await, 64);
        for i in 0..64 {
            let rec = store.get(&format!("task-{}", i)).await.unwrap();
            assert_eq!(rec.code, Some(i * 100 + 9));
        }
    }
}
