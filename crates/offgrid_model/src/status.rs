//! Record lifecycle status and the allowed-transition table.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The lifecycle status of a record.
///
/// Transitions are validated by [`RecordStatus::can_transition`]; call
/// sites must not assign statuses directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordStatus {
    /// The record exists in the remote catalog only; no local copy.
    #[default]
    RemoteOnly,
    /// A local copy is being materialized.
    Transferring,
    /// A local copy is fully stored and safe for offline use.
    Materialized,
    /// A local copy exists but the remote catalog holds a newer version.
    Conflicted,
}

impl RecordStatus {
    /// Returns true if the transition from `self` to `to` is allowed.
    ///
    /// The table:
    ///
    /// | from         | allowed to                    |
    /// |--------------|-------------------------------|
    /// | RemoteOnly   | Transferring                  |
    /// | Transferring | Materialized, RemoteOnly      |
    /// | Materialized | Conflicted, RemoteOnly        |
    /// | Conflicted   | Materialized, RemoteOnly      |
    ///
    /// `Conflicted -> Transferring` is deliberately absent: pulling the
    /// remote version first discards the stale local copy
    /// (`Conflicted -> RemoteOnly`) and then runs an ordinary transfer.
    #[must_use]
    pub fn can_transition(self, to: RecordStatus) -> bool {
        use RecordStatus::{Conflicted, Materialized, RemoteOnly, Transferring};
        matches!(
            (self, to),
            (RemoteOnly, Transferring)
                | (Transferring, Materialized)
                | (Transferring, RemoteOnly)
                | (Materialized, Conflicted)
                | (Materialized, RemoteOnly)
                | (Conflicted, Materialized)
                | (Conflicted, RemoteOnly)
        )
    }

    /// Returns true if a local copy exists in this state.
    ///
    /// These are the records visible in the offline ("only materialized")
    /// view: `Conflicted` still has a usable local copy.
    #[must_use]
    pub fn has_local_copy(&self) -> bool {
        matches!(self, RecordStatus::Materialized | RecordStatus::Conflicted)
    }

    /// Returns true if the record occupies a transfer slot.
    #[must_use]
    pub fn is_transferring(&self) -> bool {
        matches!(self, RecordStatus::Transferring)
    }
}

/// An attempted status transition outside the allowed-transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal status transition from {from:?} to {to:?}")]
pub struct TransitionError {
    /// The status the record was in.
    pub from: RecordStatus,
    /// The status that was requested.
    pub to: RecordStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_transitions() {
        assert!(RecordStatus::RemoteOnly.can_transition(RecordStatus::Transferring));
        assert!(RecordStatus::Transferring.can_transition(RecordStatus::Materialized));
        assert!(RecordStatus::Transferring.can_transition(RecordStatus::RemoteOnly));
        assert!(RecordStatus::Materialized.can_transition(RecordStatus::Conflicted));
        assert!(RecordStatus::Materialized.can_transition(RecordStatus::RemoteOnly));
        assert!(RecordStatus::Conflicted.can_transition(RecordStatus::Materialized));
        assert!(RecordStatus::Conflicted.can_transition(RecordStatus::RemoteOnly));
    }

    #[test]
    fn rejected_transitions() {
        // The case the transition table exists to catch.
        assert!(!RecordStatus::Conflicted.can_transition(RecordStatus::Transferring));

        assert!(!RecordStatus::RemoteOnly.can_transition(RecordStatus::Materialized));
        assert!(!RecordStatus::RemoteOnly.can_transition(RecordStatus::Conflicted));
        assert!(!RecordStatus::Transferring.can_transition(RecordStatus::Conflicted));
        assert!(!RecordStatus::Materialized.can_transition(RecordStatus::Transferring));
    }

    #[test]
    fn self_transitions_rejected() {
        for status in [
            RecordStatus::RemoteOnly,
            RecordStatus::Transferring,
            RecordStatus::Materialized,
            RecordStatus::Conflicted,
        ] {
            assert!(!status.can_transition(status));
        }
    }

    #[test]
    fn local_copy_predicate() {
        assert!(RecordStatus::Materialized.has_local_copy());
        assert!(RecordStatus::Conflicted.has_local_copy());
        assert!(!RecordStatus::RemoteOnly.has_local_copy());
        assert!(!RecordStatus::Transferring.has_local_copy());
    }
}
