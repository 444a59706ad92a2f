//! # OffGrid Catalog
//!
//! Remote catalog source adapter for the OffGrid vault.
//!
//! The sync engine consumes the remote record catalog through the
//! [`CatalogSource`] trait. Implementations:
//!
//! - [`StaticCatalog`] - a fixed in-process catalog; also provides the
//!   built-in fallback records
//! - [`ResilientCatalog`] - decorator that applies a bounded timeout and
//!   degrades to a fallback catalog on failure, never surfacing
//!   connectivity errors to the engine
//! - [`MockCatalog`] - scripted source for tests

mod error;
mod mock;
mod resilient;
mod source;
mod r#static;

pub use error::{CatalogError, CatalogResult};
pub use mock::MockCatalog;
pub use resilient::ResilientCatalog;
pub use source::CatalogSource;
pub use r#static::StaticCatalog;
