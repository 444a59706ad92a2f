//! Record store trait definition.

use crate::error::StoreResult;
use offgrid_model::Record;

/// Key-addressed persistent storage of materialized records.
///
/// Stores are keyed by [`Record::id`]. Each operation is an atomic
/// scoped transaction: acquire, perform, release, with no partial-write
/// visibility to other callers.
///
/// # Invariants
///
/// - `put` replaces any existing record with the same id
/// - `get_all` returns exactly the records previously put and not deleted,
///   in unspecified order
/// - `delete` of an absent id is a no-op
/// - Stores must be `Send + Sync`; the engine may be driven from one
///   thread while another signals it
///
/// # Implementors
///
/// - [`super::MemoryStore`] - for testing
/// - [`super::FileStore`] - for persistent storage
pub trait RecordStore: Send + Sync {
    /// Inserts or replaces a record, keyed by its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the write cannot be made durable.
    fn put(&self, record: &Record) -> StoreResult<()>;

    /// Returns all stored records.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or decoded.
    fn get_all(&self) -> StoreResult<Vec<Record>>;

    /// Removes the record with the given id, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal cannot be made durable.
    fn delete(&self, id: &str) -> StoreResult<()>;

    /// Removes all stored records.
    ///
    /// # Errors
    ///
    /// Returns an error if the wipe cannot be made durable.
    fn clear(&self) -> StoreResult<()>;
}
