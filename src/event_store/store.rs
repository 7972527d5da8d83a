//! Event stream backend
//!
//! The append-only event log behind the aggregate repository. Appends are
//! guarded by an expected-version check, the single consistency primitive
//! this crate relies on: of two writers racing from the same version,
//! exactly one append succeeds.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use sqlx::PgPool;

use super::EventStoreError;

/// Expected version of a stream that holds no events yet.
pub const EMPTY_STREAM_VERSION: i64 = -1;

/// Domain event trait
///
/// All domain events must implement this trait to be persisted; the type
/// tag is stored next to the payload for diagnostics and projections.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync {
    fn event_type(&self) -> &'static str;
}

/// An event to be appended, serialized and tagged.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub event_type: String,
    pub data: serde_json::Value,
}

impl NewEvent {
    /// Serialize a domain event for appending.
    pub fn from_event<E: DomainEvent>(event: &E) -> Result<Self, EventStoreError> {
        Ok(Self {
            event_type: event.event_type().to_string(),
            data: serde_json::to_value(event)?,
        })
    }
}

/// An event read back from a stream.
#[derive(Debug, Clone)]
pub struct RecordedEvent {
    pub sequence: i64,
    pub event_type: String,
    pub data: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

/// Append-only, per-stream-ordered event log.
///
/// Sequences are zero-based and contiguous within a stream. A stream that
/// has never been written to reads back empty; that is a new aggregate,
/// not an error.
#[async_trait]
pub trait EventStream: Send + Sync {
    /// Read events with `sequence >= from_sequence`, in ascending order.
    async fn read_stream(
        &self,
        stream_key: &str,
        from_sequence: i64,
    ) -> Result<Vec<RecordedEvent>, EventStoreError>;

    /// Append `events` to the stream, failing with
    /// [`EventStoreError::ConcurrencyConflict`] unless the stream's last
    /// sequence equals `expected_version` ([`EMPTY_STREAM_VERSION`] for a
    /// stream with no events). Returns the new last sequence.
    async fn append_to_stream(
        &self,
        stream_key: &str,
        expected_version: i64,
        events: &[NewEvent],
    ) -> Result<i64, EventStoreError>;
}

// =========================================================================
// PostgreSQL backend
// =========================================================================

/// Event stream backed by the `events` table.
#[derive(Debug, Clone)]
pub struct PostgresEventStream {
    pool: PgPool,
}

impl PostgresEventStream {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Current last sequence of a stream, [`EMPTY_STREAM_VERSION`] when the
    /// stream has no events.
    pub async fn current_version(&self, stream_key: &str) -> Result<i64, EventStoreError> {
        let version: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(MAX(sequence), -1) FROM events WHERE stream_key = $1
            "#,
        )
        .bind(stream_key)
        .fetch_one(&self.pool)
        .await?;

        Ok(version)
    }
}

#[async_trait]
impl EventStream for PostgresEventStream {
    async fn read_stream(
        &self,
        stream_key: &str,
        from_sequence: i64,
    ) -> Result<Vec<RecordedEvent>, EventStoreError> {
        let rows: Vec<(i64, String, serde_json::Value, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT sequence, event_type, event_data, recorded_at
            FROM events
            WHERE stream_key = $1 AND sequence >= $2
            ORDER BY sequence ASC
            "#,
        )
        .bind(stream_key)
        .bind(from_sequence)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(
            stream_key,
            from_sequence,
            count = rows.len(),
            "loaded events"
        );

        Ok(rows
            .into_iter()
            .map(|(sequence, event_type, data, recorded_at)| RecordedEvent {
                sequence,
                event_type,
                data,
                recorded_at,
            })
            .collect())
    }

    async fn append_to_stream(
        &self,
        stream_key: &str,
        expected_version: i64,
        events: &[NewEvent],
    ) -> Result<i64, EventStoreError> {
        if events.is_empty() {
            return Err(EventStoreError::EmptyAppend);
        }

        let mut tx = self.pool.begin().await?;

        // Optimistic concurrency: the check and the inserts share one
        // transaction, so a racing writer commits first or conflicts here.
        let actual: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(MAX(sequence), -1) FROM events WHERE stream_key = $1
            "#,
        )
        .bind(stream_key)
        .fetch_one(&mut *tx)
        .await?;

        if actual != expected_version {
            return Err(EventStoreError::ConcurrencyConflict {
                stream_key: stream_key.to_string(),
                expected: expected_version,
                actual,
            });
        }

        let mut sequence = expected_version;
        for event in events {
            sequence += 1;
            sqlx::query(
                r#"
                INSERT INTO events (stream_key, sequence, event_type, event_data, recorded_at)
                VALUES ($1, $2, $3, $4, NOW())
                "#,
            )
            .bind(stream_key)
            .bind(sequence)
            .bind(&event.event_type)
            .bind(&event.data)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                // A writer that slipped past the version check between our
                // read and this insert trips the (stream_key, sequence)
                // primary key; that is a lost race, not a storage fault.
                let lost_race = matches!(
                    &e,
                    sqlx::Error::Database(de)
                        if matches!(de.kind(), sqlx::error::ErrorKind::UniqueViolation)
                );
                if lost_race {
                    EventStoreError::ConcurrencyConflict {
                        stream_key: stream_key.to_string(),
                        expected: expected_version,
                        actual: sequence,
                    }
                } else {
                    EventStoreError::Database(e)
                }
            })?;
        }

        tx.commit().await?;

        tracing::info!(
            stream_key,
            new_version = sequence,
            event_count = events.len(),
            "appended events"
        );

        Ok(sequence)
    }
}

// =========================================================================
// In-memory backend
// =========================================================================

/// Thread-safe in-memory event stream for tests and examples.
///
/// Same expected-version semantics as the Postgres backend; the write lock
/// makes the check-and-append atomic.
#[derive(Debug, Clone, Default)]
pub struct MemoryEventStream {
    inner: Arc<RwLock<HashMap<String, Vec<RecordedEvent>>>>,
}

impl MemoryEventStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current last sequence of a stream, [`EMPTY_STREAM_VERSION`] when the
    /// stream has no events.
    pub fn current_version(&self, stream_key: &str) -> i64 {
        self.inner
            .read()
            .expect("event stream lock poisoned")
            .get(stream_key)
            .and_then(|events| events.last().map(|e| e.sequence))
            .unwrap_or(EMPTY_STREAM_VERSION)
    }
}

#[async_trait]
impl EventStream for MemoryEventStream {
    async fn read_stream(
        &self,
        stream_key: &str,
        from_sequence: i64,
    ) -> Result<Vec<RecordedEvent>, EventStoreError> {
        let inner = self.inner.read().expect("event stream lock poisoned");

        Ok(inner
            .get(stream_key)
            .map(|events| {
                events
                    .iter()
                    .filter(|e| e.sequence >= from_sequence)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn append_to_stream(
        &self,
        stream_key: &str,
        expected_version: i64,
        events: &[NewEvent],
    ) -> Result<i64, EventStoreError> {
        if events.is_empty() {
            return Err(EventStoreError::EmptyAppend);
        }

        let mut inner = self.inner.write().expect("event stream lock poisoned");
        let stream = inner.entry(stream_key.to_string()).or_default();

        let actual = stream
            .last()
            .map(|e| e.sequence)
            .unwrap_or(EMPTY_STREAM_VERSION);
        if actual != expected_version {
            return Err(EventStoreError::ConcurrencyConflict {
                stream_key: stream_key.to_string(),
                expected: expected_version,
                actual,
            });
        }

        let mut sequence = expected_version;
        for event in events {
            sequence += 1;
            stream.push(RecordedEvent {
                sequence,
                event_type: event.event_type.clone(),
                data: event.data.clone(),
                recorded_at: Utc::now(),
            });
        }

        Ok(sequence)
    }
}
