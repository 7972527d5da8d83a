//! Checkpoint module
//!
//! Persists the last acknowledged stream position per named consumer, so
//! catch-up subscriptions and projections can resume where they left off.

mod memory;
mod postgres;

pub use memory::MemoryCheckpointStore;
pub use postgres::PostgresCheckpointStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Last acknowledged position of one named consumer.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    pub checkpoint_id: String,
    pub position: i64,
    pub updated_at: DateTime<Utc>,
}

/// Errors that can occur in the checkpoint store
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    /// Checkpoint id was empty
    #[error("checkpoint id must not be empty")]
    EmptyCheckpointId,

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Key-to-position store with upsert semantics.
///
/// The stored position is the last event a consumer has fully processed;
/// consumers resume reading at `position + 1`.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Load the checkpoint for `checkpoint_id`, or `None` when the
    /// consumer has never checkpointed.
    async fn load_checkpoint(
        &self,
        checkpoint_id: &str,
    ) -> Result<Option<Checkpoint>, CheckpointError>;

    /// Upsert the position for `checkpoint_id`.
    async fn save_checkpoint(
        &self,
        checkpoint_id: &str,
        position: i64,
    ) -> Result<(), CheckpointError>;
}
