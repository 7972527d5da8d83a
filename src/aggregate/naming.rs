//! Aggregate name resolution
//!
//! Maps an aggregate type name to the canonical name used for its stream,
//! snapshot, and checkpoint records. Persisted naming is decoupled from the
//! in-memory type name so a type rename does not orphan existing streams.

use uuid::Uuid;

/// Errors from resolving an aggregate name.
#[derive(Debug, thiserror::Error)]
pub enum NamingError {
    /// The supplied type name was empty
    #[error("aggregate type name must not be empty")]
    EmptyTypeName,

    /// Stripping produced an empty name
    #[error("aggregate type name {0:?} resolves to an empty name")]
    EmptyResolvedName(String),
}

/// Strategy for producing a storage-safe name from an aggregate type name.
pub trait AggregateNaming: Send + Sync {
    /// Resolve the canonical name for `type_name`.
    fn aggregate_name(&self, type_name: &str) -> Result<String, NamingError>;
}

/// Default strategy: drop every occurrence of the literal `"Aggregate"`
/// from the type name and keep the remainder as-is.
///
/// `"OrderAggregate"` resolves to `"Order"`; `"CustomerAggregateV2"`
/// resolves to `"CustomerV2"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuffixStrippingNaming;

impl AggregateNaming for SuffixStrippingNaming {
    fn aggregate_name(&self, type_name: &str) -> Result<String, NamingError> {
        if type_name.is_empty() {
            return Err(NamingError::EmptyTypeName);
        }

        let resolved = type_name.replace("Aggregate", "");
        if resolved.is_empty() {
            return Err(NamingError::EmptyResolvedName(type_name.to_string()));
        }

        Ok(resolved)
    }
}

/// Build the key addressing one aggregate instance's stream, snapshot, and
/// checkpoint records: `"{name}-{id}"`.
pub fn stream_key(aggregate_name: &str, id: Uuid) -> String {
    format!("{}-{}", aggregate_name, id)
}
