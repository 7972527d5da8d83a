//! Aggregate module
//!
//! Aggregate Root pattern for Event Sourcing: state is derived from an
//! ordered sequence of events, never mutated directly.

pub mod naming;

pub use naming::{stream_key, AggregateNaming, NamingError, SuffixStrippingNaming};

/// Version of an aggregate that has had no events applied.
pub const NEW_AGGREGATE_VERSION: i64 = -1;

/// Aggregate trait that all event-sourced aggregates implement.
///
/// An aggregate carries three pieces of bookkeeping next to its domain
/// state: its identity, its version (the sequence number of the last event
/// reflected in the state, `-1` for a fresh instance), and its history (the
/// events applied in the current in-memory lifetime that have not been
/// persisted yet).
///
/// State transitions go through [`when`](Aggregate::when) exclusively.
/// Domain code records new events with [`apply`](Aggregate::apply); the
/// repository rebuilds state with [`load`](Aggregate::load), which replays
/// through the same `when` without re-recording already-persisted events.
pub trait Aggregate: Default {
    /// The closed set of events this aggregate handles.
    ///
    /// Dispatch in `when` is an exhaustive match over this enum, so an
    /// unrecognized event type cannot be constructed in the first place.
    type Event;

    /// Schema version of the aggregate's snapshot payload.
    ///
    /// Bump this when the serialized shape of the aggregate changes
    /// incompatibly; stored snapshots with a different version are
    /// discarded on load and the state is rebuilt from the full stream.
    const SCHEMA_VERSION: i32;

    /// Type name handed to the name-resolution strategy (for storage).
    fn aggregate_type() -> &'static str;

    /// Get the aggregate ID.
    fn id(&self) -> uuid::Uuid;

    /// Sequence number of the last event reflected in the state.
    fn version(&self) -> i64;

    /// Set the version directly. Used by [`load`](Aggregate::load) during
    /// reconstruction; domain code has no business calling this.
    fn set_version(&mut self, version: i64);

    /// Events applied in memory since construction, in application order.
    fn history(&self) -> &[Self::Event];

    /// Mutable access to the history; backs the provided methods.
    fn history_mut(&mut self) -> &mut Vec<Self::Event>;

    /// Mutate state in response to a single event. Must not record the
    /// event anywhere; `apply` and `load` own the bookkeeping.
    fn when(&mut self, event: &Self::Event);

    /// Apply a new, not-yet-persisted event: mutate state, record the
    /// event in the history, advance the version by one.
    fn apply(&mut self, event: Self::Event) {
        self.when(&event);
        self.history_mut().push(event);
        let version = self.version();
        self.set_version(version + 1);
    }

    /// Replay persisted history and set the version to `version` directly.
    ///
    /// The events pass through `when` only; the in-memory history is left
    /// untouched, so a subsequent save appends nothing that was already
    /// persisted.
    fn load<I>(&mut self, version: i64, history: I)
    where
        I: IntoIterator<Item = Self::Event>,
    {
        for event in history {
            self.when(&event);
        }
        self.set_version(version);
    }

    /// Drain the uncommitted history, leaving it empty.
    fn take_history(&mut self) -> Vec<Self::Event> {
        std::mem::take(self.history_mut())
    }
}
