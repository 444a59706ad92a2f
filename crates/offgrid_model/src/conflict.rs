//! Conflict bookkeeping for diverged records.

use crate::record::Record;
use serde::{Deserialize, Serialize};

/// A detected divergence between a local materialized copy and a newer
/// remote version of the same record.
///
/// The remote version is retained so a pull-remote resolution can run
/// without refetching the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// Record id.
    pub id: String,
    /// `last_modified` of the local copy.
    pub local_modified: u64,
    /// `last_modified` of the remote version; strictly greater than
    /// `local_modified`.
    pub remote_modified: u64,
    /// The remote version of the record.
    pub remote: Record,
}

impl Conflict {
    /// Builds a conflict entry from a stale local copy and the newer
    /// remote version.
    ///
    /// Returns `None` unless `remote.last_modified` is strictly newer;
    /// equal timestamps are not a conflict.
    #[must_use]
    pub fn detect(local: &Record, remote: &Record) -> Option<Self> {
        if local.id != remote.id || remote.last_modified <= local.last_modified {
            return None;
        }
        Some(Self {
            id: local.id.clone(),
            local_modified: local.last_modified,
            remote_modified: remote.last_modified,
            remote: remote.clone(),
        })
    }
}

/// The user's decision for a conflicted record.
///
/// Resolution is binary; there is no field-level merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionChoice {
    /// Keep the local copy and stamp it as the latest write.
    KeepLocal,
    /// Discard the local copy and transfer the remote version.
    PullRemote,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_at(id: &str, last_modified: u64) -> Record {
        Record::new(id, "title", "SYSTEM", "content", "2024-05-10", last_modified)
    }

    #[test]
    fn detects_strictly_newer_remote() {
        let local = record_at("R1", 100);
        let remote = record_at("R1", 200);

        let conflict = Conflict::detect(&local, &remote).unwrap();
        assert_eq!(conflict.id, "R1");
        assert_eq!(conflict.local_modified, 100);
        assert_eq!(conflict.remote_modified, 200);
        assert_eq!(conflict.remote.last_modified, 200);
    }

    #[test]
    fn equal_timestamps_are_not_a_conflict() {
        let local = record_at("R1", 100);
        let remote = record_at("R1", 100);
        assert!(Conflict::detect(&local, &remote).is_none());
    }

    #[test]
    fn older_remote_is_not_a_conflict() {
        let local = record_at("R1", 300);
        let remote = record_at("R1", 200);
        assert!(Conflict::detect(&local, &remote).is_none());
    }

    #[test]
    fn mismatched_ids_never_conflict() {
        let local = record_at("R1", 100);
        let remote = record_at("R2", 200);
        assert!(Conflict::detect(&local, &remote).is_none());
    }
}
