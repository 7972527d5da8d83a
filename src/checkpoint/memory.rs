//! In-memory checkpoint store for tests and examples

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use super::{Checkpoint, CheckpointError, CheckpointStore};

/// Thread-safe in-memory checkpoint store.
#[derive(Debug, Clone, Default)]
pub struct MemoryCheckpointStore {
    inner: Arc<RwLock<HashMap<String, Checkpoint>>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn load_checkpoint(
        &self,
        checkpoint_id: &str,
    ) -> Result<Option<Checkpoint>, CheckpointError> {
        if checkpoint_id.is_empty() {
            return Err(CheckpointError::EmptyCheckpointId);
        }

        Ok(self
            .inner
            .read()
            .expect("checkpoint store lock poisoned")
            .get(checkpoint_id)
            .cloned())
    }

    async fn save_checkpoint(
        &self,
        checkpoint_id: &str,
        position: i64,
    ) -> Result<(), CheckpointError> {
        if checkpoint_id.is_empty() {
            return Err(CheckpointError::EmptyCheckpointId);
        }

        let checkpoint = Checkpoint {
            checkpoint_id: checkpoint_id.to_string(),
            position,
            updated_at: Utc::now(),
        };

        self.inner
            .write()
            .expect("checkpoint store lock poisoned")
            .insert(checkpoint_id.to_string(), checkpoint);

        Ok(())
    }
}
