//! PostgreSQL checkpoint store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{Checkpoint, CheckpointError, CheckpointStore};

/// Checkpoint store backed by the `checkpoints` table.
#[derive(Debug, Clone)]
pub struct PostgresCheckpointStore {
    pool: PgPool,
}

impl PostgresCheckpointStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckpointStore for PostgresCheckpointStore {
    async fn load_checkpoint(
        &self,
        checkpoint_id: &str,
    ) -> Result<Option<Checkpoint>, CheckpointError> {
        if checkpoint_id.is_empty() {
            return Err(CheckpointError::EmptyCheckpointId);
        }

        let row: Option<(String, i64, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT checkpoint_id, position, updated_at
            FROM checkpoints
            WHERE checkpoint_id = $1
            "#,
        )
        .bind(checkpoint_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(checkpoint_id, position, updated_at)| Checkpoint {
            checkpoint_id,
            position,
            updated_at,
        }))
    }

    async fn save_checkpoint(
        &self,
        checkpoint_id: &str,
        position: i64,
    ) -> Result<(), CheckpointError> {
        if checkpoint_id.is_empty() {
            return Err(CheckpointError::EmptyCheckpointId);
        }

        sqlx::query(
            r#"
            INSERT INTO checkpoints (checkpoint_id, position, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (checkpoint_id)
            DO UPDATE SET position = $2, updated_at = NOW()
            "#,
        )
        .bind(checkpoint_id)
        .bind(position)
        .execute(&self.pool)
        .await?;

        tracing::debug!(checkpoint_id, position, "checkpoint saved");

        Ok(())
    }
}
