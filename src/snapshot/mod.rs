//! Snapshot module
//!
//! Durable key/value storage for one compacted aggregate snapshot per
//! aggregate key. Saving is an upsert; loading never errors on absence.

mod memory;
mod postgres;

pub use memory::MemorySnapshotStore;
pub use postgres::PostgresSnapshotStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A compacted aggregate state at a point in time.
///
/// The payload is the serialized aggregate; its embedded version is the
/// replay starting point. A payload of `None` means the aggregate had no
/// snapshot-worthy state when the record was written.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub aggregate_key: String,
    pub schema_version: i32,
    pub payload: Option<String>,
    pub taken_at: DateTime<Utc>,
    pub take_snapshot_after_events: i64,
}

/// Errors that can occur in the snapshot store
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Aggregate key was empty
    #[error("aggregate key must not be empty")]
    EmptyAggregateKey,

    /// More than one snapshot row matched a key
    #[error("multiple snapshots found for aggregate key {0}")]
    AmbiguousSnapshot(String),

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Store holding at most one snapshot per aggregate key.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Upsert the snapshot for `aggregate_key`.
    ///
    /// Inserts a new record with the current timestamp when none exists;
    /// otherwise updates schema version, payload, timestamp, and threshold
    /// in place. Idempotent under retry.
    async fn save_snapshot(
        &self,
        aggregate_key: &str,
        schema_version: i32,
        payload: Option<String>,
        take_snapshot_after_events: i64,
    ) -> Result<(), SnapshotError>;

    /// Load the snapshot for `aggregate_key`, or `None` when absent.
    ///
    /// More than one matching record indicates a storage-layer invariant
    /// violation and fails with [`SnapshotError::AmbiguousSnapshot`].
    async fn load_snapshot(&self, aggregate_key: &str) -> Result<Option<Snapshot>, SnapshotError>;
}
