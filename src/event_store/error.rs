//! Event Store Errors
//!
//! Error types for event stream and aggregate repository operations.

use crate::aggregate::NamingError;
use crate::snapshot::SnapshotError;

/// Errors that can occur in the event store
#[derive(Debug, thiserror::Error)]
pub enum EventStoreError {
    /// Aggregate id was nil
    #[error("aggregate id must not be the nil uuid")]
    InvalidAggregateId,

    /// Optimistic concurrency conflict
    #[error("concurrency conflict on stream {stream_key}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        stream_key: String,
        expected: i64,
        actual: i64,
    },

    /// Append called with no events
    #[error("cannot append an empty event list")]
    EmptyAppend,

    /// Name resolution failed
    #[error("name resolution error: {0}")]
    Naming(#[from] NamingError),

    /// Snapshot store failure
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EventStoreError {
    /// Check if this error is a concurrency conflict
    pub fn is_concurrency_conflict(&self) -> bool {
        matches!(self, EventStoreError::ConcurrencyConflict { .. })
    }

    /// Check if a caller-side reload-and-retry can plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EventStoreError::ConcurrencyConflict { .. } | EventStoreError::Database(_)
        )
    }
}
