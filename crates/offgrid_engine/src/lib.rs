//! # OffGrid Engine
//!
//! Sync and conflict reconciliation engine for the OffGrid vault.
//!
//! This crate provides:
//! - [`SyncEngine`] - record lifecycle state machine, cancellable bulk
//!   transfer, storage-quota admission, and last-writer-wins conflict
//!   resolution
//! - [`TransferDriver`] - pluggable checkpoint pacing, so a real chunked
//!   transfer can replace the simulated one without touching the state
//!   machine
//! - [`projection`] - pure filtered/sorted views for presentation
//!
//! ## Architecture
//!
//! The engine owns all record, status, and quota state, constructed with
//! injected adapters: a [`offgrid_store::RecordStore`] for the local
//! vault and a [`offgrid_catalog::CatalogSource`] for the remote catalog.
//! There are no ambient globals.
//!
//! ## Key Invariants
//!
//! - For any record, the store write happens-before the in-memory status
//!   flips to `Materialized`
//! - Exactly one transfer runs at a time; cancellation is a single shared
//!   token observed at every suspension point
//! - Losing connectivity mid-transfer takes the same cleanup path as an
//!   explicit stop
//! - Storage accounting equals a full rescan at every quiescent point

mod config;
mod driver;
mod engine;
mod error;
pub mod projection;
mod report;

pub use config::VaultConfig;
pub use driver::{InstantDriver, SimulatedDriver, TransferDriver};
pub use engine::SyncEngine;
pub use error::{EngineError, EngineResult};
pub use report::{ReconcileReport, ResolveOutcome, TransferOutcome, TransferReport};
