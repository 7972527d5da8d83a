//! aggregate_store
//!
//! Event-sourced aggregate persistence: aggregates rebuild their state
//! from an append-only event stream, snapshots bound replay cost, and an
//! expected-version check on append is the sole write-side consistency
//! guarantee.

pub mod aggregate;
pub mod checkpoint;
pub mod config;
pub mod db;
pub mod event_store;
pub mod snapshot;

pub use aggregate::{
    stream_key, Aggregate, AggregateNaming, NamingError, SuffixStrippingNaming,
    NEW_AGGREGATE_VERSION,
};
pub use checkpoint::{
    Checkpoint, CheckpointError, CheckpointStore, MemoryCheckpointStore, PostgresCheckpointStore,
};
pub use config::{Config, ConfigError};
pub use event_store::{
    AggregateRepository, DomainEvent, EventStoreError, EventStream, MemoryEventStream, NewEvent,
    PostgresEventStream, RecordedEvent, DEFAULT_SNAPSHOT_CADENCE, EMPTY_STREAM_VERSION,
};
pub use snapshot::{
    MemorySnapshotStore, PostgresSnapshotStore, Snapshot, SnapshotError, SnapshotStore,
};
