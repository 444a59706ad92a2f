//! Operation reports returned by the engine.

use std::time::Duration;

/// How a bulk transfer ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Every pending record was materialized.
    Completed,
    /// Nothing was pending; no state changed.
    NothingToDo,
    /// The engine was offline; no state changed.
    Offline,
    /// Another transfer was already running; no state changed.
    Busy,
    /// The transfer was cancelled (explicit stop or connectivity loss);
    /// the in-flight record was reverted, earlier completions kept.
    Cancelled,
    /// The next record would exceed capacity; earlier completions kept.
    QuotaExceeded,
}

/// The result of a bulk transfer.
#[derive(Debug, Clone)]
pub struct TransferReport {
    /// How the transfer ended.
    pub outcome: TransferOutcome,
    /// Number of records materialized by this call.
    pub completed: usize,
    /// Wall-clock duration of the operation.
    pub duration: Duration,
}

/// The result of a catalog reconcile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Total records known to the engine after the merge.
    pub total: usize,
    /// Records currently in conflict.
    pub conflicts: usize,
}

/// How a conflict resolution ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The record is `Materialized`; the conflict is gone.
    Resolved,
    /// The id was not in conflict (stale caller view); no state changed.
    NotConflicted,
    /// A bulk transfer was running; pull-remote was not started.
    Busy,
    /// The engine was offline or the pull-remote transfer was cancelled;
    /// the record stays `Conflicted` with its local copy intact.
    Aborted,
    /// Admission failed for the resolution; the record stays `Conflicted`
    /// with its local copy intact.
    QuotaExceeded,
}
