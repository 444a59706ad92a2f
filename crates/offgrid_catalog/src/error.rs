//! Error types for catalog operations.

use std::time::Duration;
use thiserror::Error;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while fetching the remote catalog.
///
/// These are internal to the adapter layer: [`super::ResilientCatalog`]
/// converts both variants into a fallback catalog, so the engine never
/// sees a connectivity error.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// The remote source could not be reached or returned a bad response.
    #[error("catalog unavailable: {0}")]
    Unavailable(String),

    /// The fetch did not complete within the bounded timeout.
    #[error("catalog fetch timed out after {waited:?}")]
    Timeout {
        /// How long the fetch was allowed to run.
        waited: Duration,
    },
}
