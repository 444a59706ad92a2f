//! Aggregate vault statistics for consumers.

use serde::{Deserialize, Serialize};

/// A snapshot of the vault's aggregate state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultStats {
    /// Number of materialized records.
    pub materialized_count: usize,
    /// Total number of records known to the engine.
    pub total_count: usize,
    /// Storage consumed by materialized records, in cost units.
    pub used_storage: u64,
    /// Configured storage capacity, in cost units.
    pub capacity: u64,
}

impl VaultStats {
    /// Fraction of capacity in use, in `0.0..=1.0`.
    ///
    /// Returns 0.0 for an unlimited (or zero) capacity.
    #[must_use]
    pub fn used_fraction(&self) -> f64 {
        if self.capacity == 0 || self.capacity == u64::MAX {
            return 0.0;
        }
        (self.used_storage as f64 / self.capacity as f64).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn used_fraction_bounds() {
        let stats = VaultStats {
            materialized_count: 2,
            total_count: 5,
            used_storage: 2,
            capacity: 4,
        };
        assert!((stats.used_fraction() - 0.5).abs() < f64::EPSILON);

        let unlimited = VaultStats {
            capacity: u64::MAX,
            ..stats
        };
        assert_eq!(unlimited.used_fraction(), 0.0);
    }
}
