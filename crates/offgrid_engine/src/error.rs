//! Error types for engine operations.

use offgrid_catalog::CatalogError;
use offgrid_model::TransitionError;
use offgrid_store::StoreError;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur during engine operations.
///
/// Recoverable conditions (offline, quota exceeded, stale resolution
/// requests) are reported through operation outcomes, not errors. Only
/// genuine failures propagate here.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The record store failed; the triggering operation did not advance
    /// the affected record to `Materialized`.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// The catalog source failed without a fallback in place.
    ///
    /// Wiring the source through `offgrid_catalog::ResilientCatalog`
    /// makes this unreachable.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// An internal status transition was rejected by the transition
    /// table. Indicates a bug in the engine, not bad input.
    #[error("state machine violation: {0}")]
    Transition(#[from] TransitionError),
}
