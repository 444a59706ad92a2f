//! The sync engine state machine.

use crate::config::VaultConfig;
use crate::driver::{SimulatedDriver, TransferDriver};
use crate::error::EngineResult;
use crate::report::{ReconcileReport, ResolveOutcome, TransferOutcome, TransferReport};
use offgrid_catalog::CatalogSource;
use offgrid_model::{
    epoch_millis, Conflict, Identity, Record, RecordStatus, ResolutionChoice, VaultStats,
};
use offgrid_store::RecordStore;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// How a single-record transfer ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransferStep {
    Completed,
    Cancelled,
    QuotaExceeded,
}

/// The sync and conflict reconciliation engine.
///
/// Owns the in-memory record list, status transitions, quota accounting,
/// cancellation, and conflict detection/resolution. Constructed with an
/// injected record store and catalog source; all state lives here, not
/// in globals.
///
/// Methods take `&self`: record state sits behind locks and flags behind
/// atomics, so a transfer can be driven from one thread while another
/// calls [`stop_transfer`](Self::stop_transfer) or
/// [`set_online`](Self::set_online). Those two signals share a single
/// cancellation token observed at every suspension point of the transfer
/// loop; they never mutate loop state directly. Mutating operations
/// (`reconcile`, `resolve_conflict`, `purge_all`, ...) are expected to be
/// issued sequentially by the host, matching the single-mutator model.
pub struct SyncEngine<S: RecordStore, C: CatalogSource> {
    config: VaultConfig,
    store: S,
    catalog: C,
    driver: Box<dyn TransferDriver>,
    records: RwLock<Vec<Record>>,
    conflicts: RwLock<Vec<Conflict>>,
    identity: RwLock<Option<Identity>>,
    online: AtomicBool,
    syncing: AtomicBool,
    cancelled: AtomicBool,
    used_storage: AtomicU64,
}

impl<S: RecordStore, C: CatalogSource> SyncEngine<S, C> {
    /// Creates an engine over the given adapters.
    ///
    /// Starts online, with no identity and an empty record list; call
    /// [`reconcile`](Self::reconcile) to populate it. Uses the default
    /// [`SimulatedDriver`] pacing.
    pub fn new(config: VaultConfig, store: S, catalog: C) -> Self {
        Self {
            config,
            store,
            catalog,
            driver: Box::new(SimulatedDriver::default()),
            records: RwLock::new(Vec::new()),
            conflicts: RwLock::new(Vec::new()),
            identity: RwLock::new(None),
            online: AtomicBool::new(true),
            syncing: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
            used_storage: AtomicU64::new(0),
        }
    }

    /// Replaces the transfer driver.
    #[must_use]
    pub fn with_driver(mut self, driver: impl TransferDriver + 'static) -> Self {
        self.driver = Box::new(driver);
        self
    }

    /// Returns a snapshot of the current record list, in merge order.
    pub fn records(&self) -> Vec<Record> {
        self.records.read().clone()
    }

    /// Returns a snapshot of the currently detected conflicts.
    pub fn conflicts(&self) -> Vec<Conflict> {
        self.conflicts.read().clone()
    }

    /// Returns aggregate vault statistics.
    pub fn stats(&self) -> VaultStats {
        let records = self.records.read();
        VaultStats {
            materialized_count: records
                .iter()
                .filter(|r| r.status == RecordStatus::Materialized)
                .count(),
            total_count: records.len(),
            used_storage: self.used_storage.load(Ordering::SeqCst),
            capacity: self.config.capacity,
        }
    }

    /// Returns the incrementally maintained storage total, in cost units.
    pub fn used_storage(&self) -> u64 {
        self.used_storage.load(Ordering::SeqCst)
    }

    /// Recomputes the storage total from scratch.
    ///
    /// At every quiescent point this equals [`used_storage`](Self::used_storage);
    /// exposed so hosts and tests can assert the accounting invariant.
    pub fn rescan_used_storage(&self) -> u64 {
        let materialized = self
            .records
            .read()
            .iter()
            .filter(|r| r.status == RecordStatus::Materialized)
            .count() as u64;
        materialized * self.config.unit_cost
    }

    /// Returns the active identity, if any.
    pub fn identity(&self) -> Option<Identity> {
        self.identity.read().clone()
    }

    /// Returns true if the engine currently considers itself online.
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Feeds the host's connectivity signal into the engine.
    ///
    /// Going offline while a transfer is running trips the shared
    /// cancellation token: the in-flight record is reverted at the next
    /// suspension point, exactly as if [`stop_transfer`](Self::stop_transfer)
    /// had been called.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
        if !online && self.syncing.load(Ordering::SeqCst) {
            self.cancelled.store(true, Ordering::SeqCst);
            debug!("connectivity lost mid-transfer, cancelling");
        }
    }

    /// Switches the active identity.
    ///
    /// Cancels any running transfer, clears all in-memory state, and
    /// re-runs [`reconcile`](Self::reconcile) under the new identity, so
    /// no record leaks across identities.
    ///
    /// # Errors
    ///
    /// Propagates store and catalog failures from the reconcile.
    pub fn set_identity(&self, identity: Option<Identity>) -> EngineResult<ReconcileReport> {
        self.stop_transfer();
        let label = identity.as_ref().map(|i| i.id.clone());
        info!(identity = label.as_deref(), "switching identity");
        *self.identity.write() = identity;
        self.records.write().clear();
        self.conflicts.write().clear();
        self.used_storage.store(0, Ordering::SeqCst);
        self.reconcile()
    }

    /// Fetches the remote catalog and merges it with the local store.
    ///
    /// For every catalog record: a local materialized copy that the
    /// remote has outmodified (strictly newer `last_modified`) becomes
    /// `Conflicted`, retaining the local content until resolved; a
    /// fresh local copy stays `Materialized`; a record with no local
    /// copy is `RemoteOnly` with the remote's fields. Local records
    /// absent from the catalog are kept after the catalog entries, in id
    /// order. Idempotent: re-running with no remote change produces the
    /// same record set.
    ///
    /// # Errors
    ///
    /// Propagates store failures, and catalog failures if the source is
    /// not wrapped in a fallback decorator.
    pub fn reconcile(&self) -> EngineResult<ReconcileReport> {
        let catalog = self.catalog.fetch_catalog()?;
        let stored = self.store.get_all()?;
        let identity = self.identity.read().clone();

        let mut local: HashMap<String, Record> = stored
            .into_iter()
            .filter(|r| visible_to(identity.as_ref(), r))
            .map(|r| (r.id.clone(), r))
            .collect();

        let mut merged = Vec::with_capacity(catalog.len() + local.len());
        let mut conflicts = Vec::new();

        for remote in catalog {
            match local.remove(&remote.id) {
                Some(stored_copy) => {
                    let local_copy = hydrate_materialized(stored_copy);
                    if let Some(conflict) = Conflict::detect(&local_copy, &remote) {
                        let mut record = local_copy;
                        record.transition(RecordStatus::Conflicted)?;
                        conflicts.push(conflict);
                        merged.push(record);
                    } else {
                        merged.push(local_copy);
                    }
                }
                None => merged.push(hydrate_remote(remote)),
            }
        }

        let mut leftover: Vec<Record> = local.into_values().map(hydrate_materialized).collect();
        leftover.sort_by(|a, b| a.id.cmp(&b.id));
        merged.extend(leftover);

        let materialized = merged
            .iter()
            .filter(|r| r.status == RecordStatus::Materialized)
            .count() as u64;
        self.used_storage
            .store(materialized * self.config.unit_cost, Ordering::SeqCst);

        let report = ReconcileReport {
            total: merged.len(),
            conflicts: conflicts.len(),
        };
        *self.records.write() = merged;
        *self.conflicts.write() = conflicts;
        debug!(
            total = report.total,
            conflicts = report.conflicts,
            "reconcile complete"
        );
        Ok(report)
    }

    /// Materializes every pending (`RemoteOnly`) record, in catalog
    /// order.
    ///
    /// No-ops (reported, not errors): offline, another transfer already
    /// running, nothing pending. Admission is checked before each record;
    /// exceeding capacity halts the loop with partial progress retained.
    /// Cancellation (explicit stop or connectivity loss) reverts the
    /// in-flight record and halts.
    ///
    /// # Errors
    ///
    /// Propagates store failures; the affected record is reverted to
    /// `RemoteOnly`, never left `Materialized` unpersisted.
    pub fn start_transfer(&self) -> EngineResult<TransferReport> {
        let start = Instant::now();
        if !self.is_online() {
            debug!("transfer request ignored: offline");
            return Ok(report(TransferOutcome::Offline, 0, start));
        }
        if self
            .syncing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Ok(report(TransferOutcome::Busy, 0, start));
        }
        self.cancelled.store(false, Ordering::SeqCst);
        let result = self.run_transfer(start);
        self.syncing.store(false, Ordering::SeqCst);
        result
    }

    /// Requests cancellation of the running transfer.
    ///
    /// Sets the shared cancellation token; the transfer loop reverts the
    /// in-flight record at its next suspension point. Idempotent, and a
    /// no-op when nothing is transferring.
    pub fn stop_transfer(&self) {
        if self.syncing.load(Ordering::SeqCst) {
            self.cancelled.store(true, Ordering::SeqCst);
            debug!("transfer stop requested");
        }
    }

    /// Resolves a conflicted record.
    ///
    /// `KeepLocal` re-persists the local copy stamped as the latest
    /// write; `PullRemote` discards the local copy and transfers the
    /// retained remote version through the ordinary transfer protocol.
    /// Either way a successful resolution leaves the record
    /// `Materialized`. Both choices are subject to quota admission, and a
    /// refused or interrupted resolution (offline, busy, over quota,
    /// cancelled) leaves the record `Conflicted` with its local copy
    /// intact and the conflict entry open. Resolving an id that is not
    /// conflicted is a no-op (`NotConflicted`) since it indicates a stale
    /// caller view.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn resolve_conflict(
        &self,
        id: &str,
        choice: ResolutionChoice,
    ) -> EngineResult<ResolveOutcome> {
        let conflict = self.conflicts.read().iter().find(|c| c.id == id).cloned();
        let Some(conflict) = conflict else {
            return Ok(ResolveOutcome::NotConflicted);
        };
        let is_conflicted = self
            .records
            .read()
            .iter()
            .any(|r| r.id == id && r.status == RecordStatus::Conflicted);
        if !is_conflicted {
            return Ok(ResolveOutcome::NotConflicted);
        }

        match choice {
            ResolutionChoice::KeepLocal => self.keep_local(id),
            ResolutionChoice::PullRemote => {
                // Same single-flight guard as the bulk path.
                if self
                    .syncing
                    .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                    .is_err()
                {
                    return Ok(ResolveOutcome::Busy);
                }
                self.cancelled.store(false, Ordering::SeqCst);
                let result = self.pull_remote(&conflict);
                self.syncing.store(false, Ordering::SeqCst);
                result
            }
        }
    }

    /// Removes a record's local copy, reverting it to `RemoteOnly`.
    ///
    /// Returns `false` if the record is unknown or has no local copy.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn delete_record(&self, id: &str) -> EngineResult<bool> {
        let status = self.records.read().iter().find(|r| r.id == id).map(|r| r.status);
        let Some(status) = status else {
            return Ok(false);
        };
        if !status.has_local_copy() {
            return Ok(false);
        }

        self.store.delete(id)?;
        if let Some(res) = self.with_record(id, |r| r.transition(RecordStatus::RemoteOnly)) {
            res?;
        }
        if status == RecordStatus::Materialized {
            self.used_storage
                .fetch_sub(self.config.unit_cost, Ordering::SeqCst);
        }
        self.conflicts.write().retain(|c| c.id != id);
        debug!(id, "local copy deleted");
        Ok(true)
    }

    /// Wipes the local vault: clears the store and reverts every record
    /// with a local copy to `RemoteOnly`.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn purge_all(&self) -> EngineResult<()> {
        self.store.clear()?;
        {
            let mut records = self.records.write();
            for record in records.iter_mut() {
                if record.status.has_local_copy() {
                    record.transition(RecordStatus::RemoteOnly)?;
                }
            }
        }
        self.conflicts.write().clear();
        self.used_storage.store(0, Ordering::SeqCst);
        info!("vault purged");
        Ok(())
    }

    // === internals ===

    fn run_transfer(&self, start: Instant) -> EngineResult<TransferReport> {
        let pending: Vec<String> = self
            .records
            .read()
            .iter()
            .filter(|r| r.status == RecordStatus::RemoteOnly)
            .map(|r| r.id.clone())
            .collect();
        if pending.is_empty() {
            return Ok(report(TransferOutcome::NothingToDo, 0, start));
        }

        let mut completed = 0;
        let mut outcome = TransferOutcome::Completed;
        for id in &pending {
            match self.transfer_one(id)? {
                TransferStep::Completed => completed += 1,
                TransferStep::Cancelled => {
                    outcome = TransferOutcome::Cancelled;
                    break;
                }
                TransferStep::QuotaExceeded => {
                    warn!(
                        used = self.used_storage.load(Ordering::SeqCst),
                        capacity = self.config.capacity,
                        "storage quota exceeded, transfer halted"
                    );
                    outcome = TransferOutcome::QuotaExceeded;
                    break;
                }
            }
        }

        debug!(completed, ?outcome, "bulk transfer finished");
        Ok(report(outcome, completed, start))
    }

    /// Transfers one record through the checkpoint protocol.
    ///
    /// Admission is checked before the record enters `Transferring`. The
    /// store write happens-before the in-memory flip to `Materialized`.
    fn transfer_one(&self, id: &str) -> EngineResult<TransferStep> {
        let used = self.used_storage.load(Ordering::SeqCst);
        if used.saturating_add(self.config.unit_cost) > self.config.capacity {
            return Ok(TransferStep::QuotaExceeded);
        }

        match self.with_record(id, |r| r.transition(RecordStatus::Transferring)) {
            Some(res) => res?,
            None => return Ok(TransferStep::Cancelled),
        }

        for checkpoint in self.driver.checkpoints() {
            // Suspension point: the only place cancellation takes effect.
            if self.cancelled.load(Ordering::SeqCst) {
                self.revert_in_flight(id)?;
                return Ok(TransferStep::Cancelled);
            }
            match self.with_record(id, |r| r.advance_progress(checkpoint)) {
                Some(res) => res?,
                None => return Ok(TransferStep::Cancelled),
            }
            self.driver.pace();
        }

        // A stop during the final pacing interval still wins over persist.
        if self.cancelled.load(Ordering::SeqCst) {
            self.revert_in_flight(id)?;
            return Ok(TransferStep::Cancelled);
        }

        // Stamp the durable clone only; a failed put must not leave a
        // mutated timestamp or owner on the reverted record.
        let owner = self.identity.read().as_ref().map(|i| i.id.clone());
        let stored = match self.with_record(id, |r| {
            let mut stored = r.clone();
            stored.last_modified = epoch_millis();
            stored.owner_id = owner;
            stored.transition(RecordStatus::Materialized).map(|()| stored)
        }) {
            Some(res) => res?,
            None => return Ok(TransferStep::Cancelled),
        };

        // Store write first; the in-memory flip only happens once the
        // record is durable.
        if let Err(err) = self.store.put(&stored) {
            self.revert_in_flight(id)?;
            return Err(err.into());
        }
        match self.with_record(id, |r| {
            r.last_modified = stored.last_modified;
            r.owner_id = stored.owner_id.clone();
            r.transition(RecordStatus::Materialized)
        }) {
            Some(res) => res?,
            None => return Ok(TransferStep::Cancelled),
        }
        self.used_storage
            .fetch_add(self.config.unit_cost, Ordering::SeqCst);
        debug!(id, "record materialized");
        Ok(TransferStep::Completed)
    }

    fn keep_local(&self, id: &str) -> EngineResult<ResolveOutcome> {
        // Re-materializing takes a quota slot like any other admission;
        // the slot was freed when the record entered `Conflicted` and may
        // have been claimed by a transfer since.
        let used = self.used_storage.load(Ordering::SeqCst);
        if used.saturating_add(self.config.unit_cost) > self.config.capacity {
            warn!(
                id,
                used,
                capacity = self.config.capacity,
                "resolution refused: storage quota exceeded"
            );
            return Ok(ResolveOutcome::QuotaExceeded);
        }

        let stored = match self.with_record(id, |r| {
            let mut stored = r.clone();
            stored.last_modified = epoch_millis();
            stored.transition(RecordStatus::Materialized).map(|()| stored)
        }) {
            Some(res) => res?,
            None => return Ok(ResolveOutcome::NotConflicted),
        };

        self.store.put(&stored)?;
        if let Some(res) = self.with_record(id, |r| {
            r.last_modified = stored.last_modified;
            r.transition(RecordStatus::Materialized)
        }) {
            res?;
        }
        self.used_storage
            .fetch_add(self.config.unit_cost, Ordering::SeqCst);
        self.conflicts.write().retain(|c| c.id != id);
        info!(id, "conflict resolved, kept local copy");
        Ok(ResolveOutcome::Resolved)
    }

    fn pull_remote(&self, conflict: &Conflict) -> EngineResult<ResolveOutcome> {
        let id = conflict.id.as_str();

        // Refuse before touching anything: the local copy is the only
        // copy until the replacement transfer completes.
        if !self.is_online() {
            debug!(id, "pull-remote refused: offline");
            return Ok(ResolveOutcome::Aborted);
        }
        let used = self.used_storage.load(Ordering::SeqCst);
        if used.saturating_add(self.config.unit_cost) > self.config.capacity {
            warn!(
                id,
                used,
                capacity = self.config.capacity,
                "resolution refused: storage quota exceeded"
            );
            return Ok(ResolveOutcome::QuotaExceeded);
        }

        // Snapshot the local copy so an interrupted pull can restore it.
        let local = match self.records.read().iter().find(|r| r.id == id).cloned() {
            Some(record) => record,
            None => return Ok(ResolveOutcome::NotConflicted),
        };

        // `Conflicted -> Transferring` is not a legal transition, so the
        // record passes through `RemoteOnly` carrying the remote's fields.
        match self.with_record(id, |r| {
            r.transition(RecordStatus::RemoteOnly)
                .map(|()| *r = hydrate_remote(conflict.remote.clone()))
        }) {
            Some(res) => res?,
            None => return Ok(ResolveOutcome::NotConflicted),
        }
        self.store.delete(id)?;

        match self.transfer_one(id)? {
            TransferStep::Completed => {
                self.conflicts.write().retain(|c| c.id != id);
                info!(id, "conflict resolved, pulled remote version");
                Ok(ResolveOutcome::Resolved)
            }
            step => {
                // Interrupted mid-pull: put the stale local copy back and
                // leave the conflict open.
                self.store.put(&hydrate_materialized(local.clone()))?;
                let _ = self.with_record(id, |r| *r = local);
                debug!(id, "pull-remote interrupted, local copy restored");
                Ok(match step {
                    TransferStep::QuotaExceeded => ResolveOutcome::QuotaExceeded,
                    _ => ResolveOutcome::Aborted,
                })
            }
        }
    }

    fn revert_in_flight(&self, id: &str) -> EngineResult<()> {
        if let Some(res) = self.with_record(id, |r| {
            if r.status.is_transferring() {
                r.transition(RecordStatus::RemoteOnly)
            } else {
                Ok(())
            }
        }) {
            res?;
        }
        debug!(id, "in-flight record reverted");
        Ok(())
    }

    fn with_record<T>(&self, id: &str, f: impl FnOnce(&mut Record) -> T) -> Option<T> {
        let mut records = self.records.write();
        records.iter_mut().find(|r| r.id == id).map(f)
    }
}

fn report(outcome: TransferOutcome, completed: usize, start: Instant) -> TransferReport {
    TransferReport {
        outcome,
        completed,
        duration: start.elapsed(),
    }
}

/// Owner filter: unowned records are visible under any identity; owned
/// records only under their owner. With no active identity only unowned
/// records are visible.
fn visible_to(identity: Option<&Identity>, record: &Record) -> bool {
    match (&record.owner_id, identity) {
        (None, _) => true,
        (Some(owner), Some(active)) => *owner == active.id,
        (Some(_), None) => false,
    }
}

/// Rehydrates a stored copy. Only materialized records are ever
/// persisted, so this is construction, not a transition.
fn hydrate_materialized(mut record: Record) -> Record {
    record.status = RecordStatus::Materialized;
    record.transfer_progress = 100;
    record
}

/// Normalizes a catalog record into its pending form.
fn hydrate_remote(mut record: Record) -> Record {
    record.status = RecordStatus::RemoteOnly;
    record.transfer_progress = 0;
    record
}
