//! File-backed record store for persistent storage.

use crate::error::{StoreError, StoreResult};
use crate::store::RecordStore;
use offgrid_model::Record;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A file-backed record store.
///
/// The whole vault is kept as a JSON snapshot on disk. Every mutation
/// rewrites the snapshot through a temporary file followed by a rename,
/// so readers never observe a partially written vault. Data survives
/// process restarts.
///
/// # Durability
///
/// The temporary file is flushed and synced before the rename.
///
/// # Thread Safety
///
/// Thread-safe; a single lock serializes all operations, which is the
/// atomic-scoped-operation contract of [`RecordStore`].
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    records: Mutex<BTreeMap<String, Record>>,
}

impl FileStore {
    /// Opens or creates a file store at the given path.
    ///
    /// If the file exists, its snapshot is loaded; otherwise the store
    /// starts empty and the file is created on the first write.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing snapshot cannot be read or parsed.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let records = if path.exists() {
            let bytes = fs::read(path)?;
            if bytes.is_empty() {
                BTreeMap::new()
            } else {
                let list: Vec<Record> = serde_json::from_slice(&bytes)?;
                let mut map = BTreeMap::new();
                for record in list {
                    if map.insert(record.id.clone(), record).is_some() {
                        return Err(StoreError::Corrupted(format!(
                            "duplicate record id in snapshot at {}",
                            path.display()
                        )));
                    }
                }
                map
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            records: Mutex::new(records),
        })
    }

    /// Opens or creates a file store, creating parent directories if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or the snapshot
    /// cannot be loaded.
    pub fn open_with_create_dirs(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Self::open(path)
    }

    /// Returns the path to the underlying snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the snapshot atomically: temp file, flush, sync, rename.
    fn persist(&self, records: &BTreeMap<String, Record>) -> StoreResult<()> {
        let list: Vec<&Record> = records.values().collect();
        let bytes = serde_json::to_vec_pretty(&list)?;

        let tmp_path = self.path.with_extension("tmp");
        let mut tmp = File::create(&tmp_path)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        tmp.sync_all()?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl RecordStore for FileStore {
    fn put(&self, record: &Record) -> StoreResult<()> {
        let mut records = self.records.lock();
        records.insert(record.id.clone(), record.clone());
        self.persist(&records)
    }

    fn get_all(&self) -> StoreResult<Vec<Record>> {
        Ok(self.records.lock().values().cloned().collect())
    }

    fn delete(&self, id: &str) -> StoreResult<()> {
        let mut records = self.records.lock();
        if records.remove(id).is_some() {
            self.persist(&records)?;
        }
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        let mut records = self.records.lock();
        records.clear();
        self.persist(&records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use offgrid_model::RecordStatus;

    fn record(id: &str) -> Record {
        let mut r = Record::new(id, "title", "SYSTEM", "content", "2024-05-10", 1000);
        r.transition(RecordStatus::Transferring).unwrap();
        r.transition(RecordStatus::Materialized).unwrap();
        r
    }

    #[test]
    fn file_store_roundtrip_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");

        {
            let store = FileStore::open(&path).unwrap();
            store.put(&record("A")).unwrap();
            store.put(&record("B")).unwrap();
        }

        let store = FileStore::open(&path).unwrap();
        let all = store.get_all().unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|r| r.status == RecordStatus::Materialized));
    }

    #[test]
    fn file_store_delete_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");

        let store = FileStore::open(&path).unwrap();
        store.put(&record("A")).unwrap();
        store.delete("A").unwrap();
        drop(store);

        let store = FileStore::open(&path).unwrap();
        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn file_store_delete_absent_does_not_touch_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");

        let store = FileStore::open(&path).unwrap();
        store.delete("missing").unwrap();
        // No write happened, so the snapshot file was never created.
        assert!(!path.exists());
    }

    #[test]
    fn file_store_clear_wipes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");

        let store = FileStore::open(&path).unwrap();
        store.put(&record("A")).unwrap();
        store.clear().unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert!(reopened.get_all().unwrap().is_empty());
    }

    #[test]
    fn file_store_rejects_duplicate_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");

        let duplicated = vec![record("A"), record("A")];
        fs::write(&path, serde_json::to_vec(&duplicated).unwrap()).unwrap();

        let result = FileStore::open(&path);
        assert!(matches!(result, Err(StoreError::Corrupted(_))));
    }

    #[test]
    fn file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");
        fs::write(&path, b"not json").unwrap();

        let result = FileStore::open(&path);
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    #[test]
    fn file_store_empty_file_is_empty_vault() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");
        fs::write(&path, b"").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert!(store.get_all().unwrap().is_empty());
    }
}
