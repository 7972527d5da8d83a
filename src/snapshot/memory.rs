//! In-memory snapshot store for tests and examples

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use super::{Snapshot, SnapshotError, SnapshotStore};

/// Thread-safe in-memory snapshot store.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    inner: Arc<RwLock<HashMap<String, Snapshot>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored snapshots, across all keys.
    pub fn len(&self) -> usize {
        self.inner.read().expect("snapshot store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn save_snapshot(
        &self,
        aggregate_key: &str,
        schema_version: i32,
        payload: Option<String>,
        take_snapshot_after_events: i64,
    ) -> Result<(), SnapshotError> {
        if aggregate_key.is_empty() {
            return Err(SnapshotError::EmptyAggregateKey);
        }

        let snapshot = Snapshot {
            aggregate_key: aggregate_key.to_string(),
            schema_version,
            payload,
            taken_at: Utc::now(),
            take_snapshot_after_events,
        };

        self.inner
            .write()
            .expect("snapshot store lock poisoned")
            .insert(aggregate_key.to_string(), snapshot);

        Ok(())
    }

    async fn load_snapshot(&self, aggregate_key: &str) -> Result<Option<Snapshot>, SnapshotError> {
        if aggregate_key.is_empty() {
            return Err(SnapshotError::EmptyAggregateKey);
        }

        Ok(self
            .inner
            .read()
            .expect("snapshot store lock poisoned")
            .get(aggregate_key)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_missing_key_returns_none() {
        let store = MemorySnapshotStore::new();
        let loaded = store.load_snapshot("Order-missing").await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_save_is_an_upsert() {
        let store = MemorySnapshotStore::new();

        store
            .save_snapshot("Order-1", 1, Some("{}".to_string()), 3)
            .await
            .unwrap();
        store
            .save_snapshot("Order-1", 2, Some(r#"{"v":2}"#.to_string()), 5)
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        let snapshot = store.load_snapshot("Order-1").await.unwrap().unwrap();
        assert_eq!(snapshot.schema_version, 2);
        assert_eq!(snapshot.payload.as_deref(), Some(r#"{"v":2}"#));
        assert_eq!(snapshot.take_snapshot_after_events, 5);
    }

    #[tokio::test]
    async fn test_save_is_idempotent_under_retry() {
        let store = MemorySnapshotStore::new();

        for _ in 0..2 {
            store
                .save_snapshot("Order-1", 1, Some("{}".to_string()), 3)
                .await
                .unwrap();
        }

        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_key_is_rejected() {
        let store = MemorySnapshotStore::new();
        assert!(matches!(
            store.save_snapshot("", 1, None, 3).await,
            Err(SnapshotError::EmptyAggregateKey)
        ));
        assert!(matches!(
            store.load_snapshot("").await,
            Err(SnapshotError::EmptyAggregateKey)
        ));
    }

    #[tokio::test]
    async fn test_nullable_payload_round_trips() {
        let store = MemorySnapshotStore::new();
        store.save_snapshot("Order-1", 1, None, 3).await.unwrap();

        let snapshot = store.load_snapshot("Order-1").await.unwrap().unwrap();
        assert!(snapshot.payload.is_none());
    }
}
