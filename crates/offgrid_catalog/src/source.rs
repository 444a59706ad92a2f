//! Catalog source trait definition.

use crate::error::CatalogResult;
use offgrid_model::Record;

/// A source of the canonical remote record catalog.
///
/// This trait abstracts the remote side, allowing for different
/// implementations (HTTP backend, static fixture, mock for testing).
/// Each returned record carries the remote `last_modified`, which drives
/// last-writer-wins conflict detection.
pub trait CatalogSource: Send + Sync {
    /// Fetches the full remote catalog.
    ///
    /// Catalog order is meaningful: the engine transfers records in the
    /// order returned here.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is unreachable or the response
    /// cannot be decoded.
    fn fetch_catalog(&self) -> CatalogResult<Vec<Record>>;
}
