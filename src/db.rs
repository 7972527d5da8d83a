//! Database module
//!
//! Connection, schema verification, and bootstrap utilities for the
//! Postgres-backed stores.

use sqlx::PgPool;

/// Simple connectivity check
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;

    Ok(())
}

/// Check if required tables exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    let required_tables = vec!["events", "snapshots", "checkpoints"];

    for table in required_tables {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    Ok(true)
}

/// Create the required tables when they are missing.
///
/// Mirrors `migrations/schema.sql`; intended for tests and local
/// bootstrap, production deployments run the migration file.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS events (
            stream_key   TEXT        NOT NULL,
            sequence     BIGINT      NOT NULL,
            event_type   TEXT        NOT NULL,
            event_data   JSONB       NOT NULL,
            recorded_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (stream_key, sequence)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS snapshots (
            aggregate_key              TEXT        NOT NULL PRIMARY KEY,
            schema_version             INTEGER     NOT NULL,
            payload                    TEXT,
            taken_at                   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            take_snapshot_after_events BIGINT      NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS checkpoints (
            checkpoint_id TEXT        NOT NULL PRIMARY KEY,
            position      BIGINT      NOT NULL,
            updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
