//! Event Store module
//!
//! Persistence layer for Event Sourcing: the append-only event stream
//! backends and the aggregate repository orchestrating load/save on top.

mod error;
mod repository;
mod store;

pub use error::EventStoreError;
pub use repository::{AggregateRepository, DEFAULT_SNAPSHOT_CADENCE};
pub use store::{
    DomainEvent, EventStream, MemoryEventStream, NewEvent, PostgresEventStream, RecordedEvent,
    EMPTY_STREAM_VERSION,
};
