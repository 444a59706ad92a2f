//! Fixed in-process catalog.

use crate::error::CatalogResult;
use crate::source::CatalogSource;
use offgrid_model::Record;

/// A catalog source backed by a fixed list of records.
///
/// Used directly in tests and demos, and as the built-in fallback that
/// [`super::ResilientCatalog`] degrades to when the real source fails.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    records: Vec<Record>,
}

impl StaticCatalog {
    /// Creates a catalog over the given records.
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// The built-in fallback catalog.
    ///
    /// Served when the remote source is unreachable so the vault stays
    /// functional without a backend.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(vec![
            Record::new(
                "DATA-001",
                "Network Config Pack",
                "WIFI",
                "Pre-cached local network settings for high-speed offline access.",
                "2024-05-10",
                1_715_340_000_000,
            ),
            Record::new(
                "DATA-002",
                "Offline Resource Bundle",
                "SYSTEM",
                "Core system assets and media files for disconnected browsing.",
                "2024-05-12",
                1_715_512_800_000,
            ),
            Record::new(
                "DATA-003",
                "Field Operations Guide",
                "MANUAL",
                "Step-by-step procedures for manual network overrides.",
                "2024-05-14",
                1_715_685_600_000,
            ),
            Record::new(
                "DATA-004",
                "Security Auth Keys",
                "AUTH",
                "Encrypted tokens required for offline device verification.",
                "2024-05-15",
                1_715_772_000_000,
            ),
            Record::new(
                "DATA-005",
                "Universal Map Data",
                "GEO",
                "High-resolution offline terrain mapping for global navigation.",
                "2024-05-16",
                1_715_858_400_000,
            ),
        ])
    }

    /// Returns the catalog records without going through the trait.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }
}

impl CatalogSource for StaticCatalog {
    fn fetch_catalog(&self) -> CatalogResult<Vec<Record>> {
        Ok(self.records.clone())
    }
}
