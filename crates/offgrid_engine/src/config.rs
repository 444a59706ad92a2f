//! Configuration for the vault engine.

/// Configuration for the sync engine.
///
/// Storage is measured in abstract cost units. The default policy is a
/// uniform cost per record; a byte-accurate policy only needs different
/// constants.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Maximum total storage the vault may consume, in cost units.
    pub capacity: u64,
    /// Storage cost attributed to each materialized record.
    pub unit_cost: u64,
}

impl VaultConfig {
    /// Creates a configuration with unlimited capacity and unit cost 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            capacity: u64::MAX,
            unit_cost: 1,
        }
    }

    /// Sets the storage capacity.
    #[must_use]
    pub fn with_capacity(mut self, capacity: u64) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the per-record storage cost.
    #[must_use]
    pub fn with_unit_cost(mut self, unit_cost: u64) -> Self {
        self.unit_cost = unit_cost;
        self
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self::new()
    }
}
