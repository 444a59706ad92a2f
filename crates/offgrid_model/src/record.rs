//! The record type and its status transitions.

use crate::status::{RecordStatus, TransitionError};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// A single vault record.
///
/// Records originate in the remote catalog and may be materialized into
/// local storage. The same type is used for catalog entries and stored
/// copies; catalog payloads that omit `status`, `transfer_progress` or
/// `owner_id` deserialize with the defaults (`RemoteOnly`, 0, none).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier, stable across sessions. Merge key.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Enum-like category tag (e.g. `"WIFI"`, `"SYSTEM"`).
    pub category: String,
    /// Record payload.
    pub content: String,
    /// Creation timestamp, display string.
    pub created: String,
    /// Last modification time, epoch milliseconds. Drives conflict
    /// detection (last writer wins).
    pub last_modified: u64,
    /// Lifecycle status. Mutate through [`Record::transition`] only.
    #[serde(default)]
    pub status: RecordStatus,
    /// Transfer progress, 0..=100. Meaningful while `Transferring`;
    /// 100 when `Materialized`, 0 otherwise.
    #[serde(default)]
    pub transfer_progress: u8,
    /// Owning identity, when the vault is identity-scoped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

impl Record {
    /// Creates a catalog entry with the given fields, `RemoteOnly` and
    /// zero progress.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        category: impl Into<String>,
        content: impl Into<String>,
        created: impl Into<String>,
        last_modified: u64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            category: category.into(),
            content: content.into(),
            created: created.into(),
            last_modified,
            status: RecordStatus::RemoteOnly,
            transfer_progress: 0,
            owner_id: None,
        }
    }

    /// Moves the record to `to`, validating against the transition table
    /// and normalizing `transfer_progress` for the target state.
    ///
    /// Progress rules on entry:
    /// - `Transferring` -> 0 (a fresh attempt)
    /// - `Materialized` -> 100 (a complete copy)
    /// - `RemoteOnly` / `Conflicted` -> 0
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] if the transition is not in the table;
    /// the record is left untouched.
    pub fn transition(&mut self, to: RecordStatus) -> Result<(), TransitionError> {
        if !self.status.can_transition(to) {
            return Err(TransitionError {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.transfer_progress = match to {
            RecordStatus::Materialized => 100,
            _ => 0,
        };
        Ok(())
    }

    /// Advances `transfer_progress` to `checkpoint` while `Transferring`.
    ///
    /// Progress is monotonic within one attempt; a checkpoint below the
    /// current value is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] (with `from == to == status`) if the
    /// record is not `Transferring`.
    pub fn advance_progress(&mut self, checkpoint: u8) -> Result<(), TransitionError> {
        if self.status != RecordStatus::Transferring {
            return Err(TransitionError {
                from: self.status,
                to: self.status,
            });
        }
        self.transfer_progress = self.transfer_progress.max(checkpoint.min(100));
        Ok(())
    }
}

/// Returns the current Unix time in milliseconds.
///
/// Clamps to 0 if the system clock reads before the epoch.
#[must_use]
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
