//! PostgreSQL snapshot store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{Snapshot, SnapshotError, SnapshotStore};

/// Snapshot store backed by the `snapshots` table.
#[derive(Debug, Clone)]
pub struct PostgresSnapshotStore {
    pool: PgPool,
}

impl PostgresSnapshotStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnapshotStore for PostgresSnapshotStore {
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

        let mut tx = self.pool.begin().await?;

        // One logical record per key: look the key up, then insert or
        // update in place. The unique index backs this up under races.
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (SELECT 1 FROM snapshots WHERE aggregate_key = $1)
            "#,
        )
        .bind(aggregate_key)
        .fetch_one(&mut *tx)
        .await?;

        if exists {
            sqlx::query(
                r#"
                UPDATE snapshots
                SET schema_version = $2,
                    payload = $3,
                    taken_at = NOW(),
                    take_snapshot_after_events = $4
                WHERE aggregate_key = $1
                "#,
            )
            .bind(aggregate_key)
            .bind(schema_version)
            .bind(&payload)
            .bind(take_snapshot_after_events)
            .execute(&mut *tx)
            .await?;
        } else {
            sqlx::query(
                r#"
                INSERT INTO snapshots (
                    aggregate_key, schema_version, payload, taken_at, take_snapshot_after_events
                )
                VALUES ($1, $2, $3, NOW(), $4)
                ON CONFLICT (aggregate_key)
                DO UPDATE SET
                    schema_version = $2,
                    payload = $3,
                    taken_at = NOW(),
                    take_snapshot_after_events = $4
                "#,
            )
            .bind(aggregate_key)
            .bind(schema_version)
            .bind(&payload)
            .bind(take_snapshot_after_events)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(aggregate_key, schema_version, "snapshot saved");

        Ok(())
    }

    async fn load_snapshot(&self, aggregate_key: &str) -> Result<Option<Snapshot>, SnapshotError> {
        if aggregate_key.is_empty() {
            return Err(SnapshotError::EmptyAggregateKey);
        }

        let rows: Vec<(String, i32, Option<String>, DateTime<Utc>, i64)> = sqlx::query_as(
            r#"
            SELECT aggregate_key, schema_version, payload, taken_at, take_snapshot_after_events
            FROM snapshots
            WHERE aggregate_key = $1
            "#,
        )
        .bind(aggregate_key)
        .fetch_all(&self.pool)
        .await?;

        if rows.len() > 1 {
            return Err(SnapshotError::AmbiguousSnapshot(aggregate_key.to_string()));
        }

        Ok(rows.into_iter().next().map(
            |(aggregate_key, schema_version, payload, taken_at, take_snapshot_after_events)| {
                Snapshot {
                    aggregate_key,
                    schema_version,
                    payload,
                    taken_at,
                    take_snapshot_after_events,
                }
            },
        ))
    }
}
