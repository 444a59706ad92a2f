//! In-memory record store for testing.

use crate::error::StoreResult;
use crate::store::RecordStore;
use offgrid_model::Record;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// An in-memory record store.
///
/// Suitable for unit tests, integration tests, and ephemeral vaults that
/// don't need persistence.
///
/// # Thread Safety
///
/// Thread-safe; operations lock the whole map for their duration, which
/// gives the atomic-scoped-operation behavior the engine expects.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<String, Record>>,
}

impl MemoryStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the given records.
    ///
    /// Useful for testing merge and recovery scenarios.
    #[must_use]
    pub fn with_records(records: Vec<Record>) -> Self {
        let map = records.into_iter().map(|r| (r.id.clone(), r)).collect();
        Self {
            records: RwLock::new(map),
        }
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn put(&self, record: &Record) -> StoreResult<()> {
        self.records
            .write()
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn get_all(&self) -> StoreResult<Vec<Record>> {
        Ok(self.records.read().values().cloned().collect())
    }

    fn delete(&self, id: &str) -> StoreResult<()> {
        self.records.write().remove(id);
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        self.records.write().clear();
        Ok(())
    }
}
