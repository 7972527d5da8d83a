//! Aggregate Repository
//!
//! Core orchestration of the load/save protocol: reconstruct aggregate
//! state from a snapshot plus the event tail, append new events with an
//! optimistic concurrency check, and refresh the snapshot on cadence.

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::aggregate::{stream_key, Aggregate, AggregateNaming, SuffixStrippingNaming};
use crate::snapshot::SnapshotStore;

use super::store::{DomainEvent, EventStream, NewEvent};
use super::EventStoreError;

/// Default snapshot cadence: one snapshot per this many events.
pub const DEFAULT_SNAPSHOT_CADENCE: i64 = 100;

/// Repository reconstructing aggregates on load and persisting their
/// uncommitted history on save.
///
/// All collaborators are injected at construction. The event stream is the
/// source of truth; snapshots only bound replay cost, and a stale snapshot
/// is healed by replaying the missing tail on the next load.
#[derive(Debug, Clone)]
pub struct AggregateRepository<S, P, N = SuffixStrippingNaming> {
    events: S,
    snapshots: P,
    naming: N,
    take_snapshot_after_events: i64,
}

impl<S, P> AggregateRepository<S, P> {
    /// Create a repository with the default naming strategy and snapshot
    /// cadence.
    pub fn new(events: S, snapshots: P) -> Self {
        Self {
            events,
            snapshots,
            naming: SuffixStrippingNaming,
            take_snapshot_after_events: DEFAULT_SNAPSHOT_CADENCE,
        }
    }
}

impl<S, P, N> AggregateRepository<S, P, N> {
    /// Replace the name-resolution strategy.
    pub fn with_naming<N2>(self, naming: N2) -> AggregateRepository<S, P, N2> {
        AggregateRepository {
            events: self.events,
            snapshots: self.snapshots,
            naming,
            take_snapshot_after_events: self.take_snapshot_after_events,
        }
    }

    /// Take a snapshot after every `events` persisted events. Must be
    /// positive.
    pub fn with_snapshot_cadence(mut self, events: i64) -> Self {
        debug_assert!(events > 0, "snapshot cadence must be positive");
        self.take_snapshot_after_events = events;
        self
    }

    pub fn event_stream(&self) -> &S {
        &self.events
    }

    pub fn snapshot_store(&self) -> &P {
        &self.snapshots
    }
}

impl<S, P, N> AggregateRepository<S, P, N>
where
    S: EventStream,
    P: SnapshotStore,
    N: AggregateNaming,
{
    /// Reconstruct an aggregate's current state.
    ///
    /// Loads the snapshot for the aggregate's key and, when its schema
    /// version matches the aggregate's declared [`Aggregate::SCHEMA_VERSION`],
    /// resumes replay right after the snapshotted version; a mismatched or
    /// absent snapshot means full replay from the start of the stream. An
    /// id with neither snapshot nor events yields a fresh aggregate at
    /// version `-1`.
    pub async fn load<A>(&self, aggregate_id: Uuid) -> Result<A, EventStoreError>
    where
        A: Aggregate + DeserializeOwned,
        A::Event: DomainEvent,
    {
        if aggregate_id.is_nil() {
            return Err(EventStoreError::InvalidAggregateId);
        }

        let name = self.naming.aggregate_name(A::aggregate_type())?;
        let key = stream_key(&name, aggregate_id);

        let mut aggregate = A::default();

        if let Some(snapshot) = self.snapshots.load_snapshot(&key).await? {
            if snapshot.schema_version == A::SCHEMA_VERSION {
                if let Some(payload) = snapshot.payload {
                    aggregate = serde_json::from_str(&payload)?;
                }
            } else {
                // Incompatible payload shape: discard and replay from the
                // start of the stream, never migrate in place.
                tracing::debug!(
                    aggregate_key = %key,
                    snapshot_schema = snapshot.schema_version,
                    current_schema = A::SCHEMA_VERSION,
                    "snapshot schema mismatch, replaying full stream"
                );
            }
        }

        let from_sequence = aggregate.version() + 1;
        let recorded = self.events.read_stream(&key, from_sequence).await?;

        let last_sequence = recorded.last().map(|e| e.sequence);
        let mut tail = Vec::with_capacity(recorded.len());
        for event in recorded {
            tail.push(serde_json::from_value(event.data)?);
        }

        let version = last_sequence.unwrap_or_else(|| aggregate.version());
        aggregate.load(version, tail);

        Ok(aggregate)
    }

    /// Persist an aggregate's uncommitted history and conditionally
    /// refresh its snapshot.
    ///
    /// The append carries the stream version observed at load time, so a
    /// writer that lost the race fails with
    /// [`EventStoreError::ConcurrencyConflict`]; the caller reloads and
    /// retries at its own layer, never this one. The snapshot write is not
    /// atomic with the append: a crash in between leaves a stale snapshot
    /// whose missing tail is replayed on the next load.
    ///
    /// Takes the aggregate by value: after a save the in-memory instance
    /// is spent, and continuing to mutate it would desynchronize its
    /// history from the stream.
    pub async fn save<A>(&self, mut aggregate: A) -> Result<i64, EventStoreError>
    where
        A: Aggregate + Serialize,
        A::Event: DomainEvent,
    {
        if aggregate.id().is_nil() {
            return Err(EventStoreError::InvalidAggregateId);
        }

        let history = aggregate.take_history();
        if history.is_empty() {
            return Ok(aggregate.version());
        }

        let name = self.naming.aggregate_name(A::aggregate_type())?;
        let key = stream_key(&name, aggregate.id());

        let mut new_events = Vec::with_capacity(history.len());
        for event in &history {
            new_events.push(NewEvent::from_event(event)?);
        }

        // The stream version as of load: the aggregate's version minus the
        // events applied since.
        let expected_version = aggregate.version() - history.len() as i64;
        let new_version = self
            .events
            .append_to_stream(&key, expected_version, &new_events)
            .await?;

        if self.take_snapshot_after_events > 0
            && (aggregate.version() + 1) % self.take_snapshot_after_events == 0
        {
            let payload = serde_json::to_string(&aggregate)?;
            self.snapshots
                .save_snapshot(
                    &key,
                    A::SCHEMA_VERSION,
                    Some(payload),
                    self.take_snapshot_after_events,
                )
                .await?;

            tracing::debug!(
                aggregate_key = %key,
                version = aggregate.version(),
                "snapshot refreshed"
            );
        }

        Ok(new_version)
    }
}
