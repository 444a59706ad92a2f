//! # OffGrid Model
//!
//! Shared data model for the OffGrid vault.
//!
//! This crate provides:
//! - [`Record`] - the unit of synchronization
//! - [`RecordStatus`] - the record lifecycle state machine with an
//!   explicit transition table
//! - [`Conflict`] and [`ResolutionChoice`] - divergence bookkeeping
//! - [`Identity`] and [`VaultStats`] - consumer-facing surface types
//!
//! ## Key Invariants
//!
//! - A record's `id` never changes; merges are keyed by `id`
//! - Status transitions go through [`Record::transition`], which rejects
//!   anything outside the transition table
//! - `transfer_progress` is 0 in every state except `Transferring`
//!   (monotonic, in flight) and `Materialized` (pinned to 100)

mod conflict;
mod identity;
mod record;
mod stats;
mod status;

pub use conflict::{Conflict, ResolutionChoice};
pub use identity::Identity;
pub use record::{epoch_millis, Record};
pub use stats::VaultStats;
pub use status::{RecordStatus, TransitionError};
