//! # OffGrid Store
//!
//! Record store adapter for the OffGrid vault: key-addressed persistent
//! storage of materialized records.
//!
//! The sync engine talks to storage exclusively through the
//! [`RecordStore`] trait and never learns the storage technology.
//! Implementations:
//!
//! - [`MemoryStore`] - for tests and ephemeral vaults
//! - [`FileStore`] - JSON snapshot on disk, written atomically

mod error;
mod file;
mod memory;
mod store;

pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::RecordStore;
