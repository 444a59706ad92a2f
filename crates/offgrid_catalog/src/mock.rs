//! A mock catalog source for testing.

use crate::error::{CatalogError, CatalogResult};
use crate::source::CatalogSource;
use offgrid_model::Record;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

/// A scriptable catalog source for tests.
///
/// Supports a settable response, an availability toggle, and an
/// artificial latency for exercising timeout paths.
#[derive(Debug, Default)]
pub struct MockCatalog {
    response: Mutex<Option<Vec<Record>>>,
    available: AtomicBool,
    latency: Mutex<Option<Duration>>,
    fetch_count: AtomicU64,
}

impl MockCatalog {
    /// Creates a new mock catalog, available and with no response set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            response: Mutex::new(None),
            available: AtomicBool::new(true),
            latency: Mutex::new(None),
            fetch_count: AtomicU64::new(0),
        }
    }

    /// Sets the records returned by subsequent fetches.
    pub fn set_response(&self, records: Vec<Record>) {
        *self.response.lock() = Some(records);
    }

    /// Sets whether fetches succeed.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Adds an artificial delay before each fetch returns.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = Some(latency);
    }

    /// Number of fetches performed so far.
    #[must_use]
    pub fn fetch_count(&self) -> u64 {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

impl CatalogSource for MockCatalog {
    fn fetch_catalog(&self) -> CatalogResult<Vec<Record>> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = *self.latency.lock() {
            thread::sleep(latency);
        }

        if !self.available.load(Ordering::SeqCst) {
            return Err(CatalogError::Unavailable("mock catalog offline".into()));
        }

        self.response
            .lock()
            .clone()
            .ok_or_else(|| CatalogError::Unavailable("no mock response set".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_returns_scripted_response() {
        let mock = MockCatalog::new();
        let records = vec![Record::new("R1", "t", "SYSTEM", "c", "2024-05-10", 1)];
        mock.set_response(records.clone());

        assert_eq!(mock.fetch_catalog().unwrap(), records);
        assert_eq!(mock.fetch_count(), 1);
    }

    #[test]
    fn mock_unavailable_errors() {
        let mock = MockCatalog::new();
        mock.set_response(vec![]);
        mock.set_available(false);

        let result = mock.fetch_catalog();
        assert!(matches!(result, Err(CatalogError::Unavailable(_))));
    }

    #[test]
    fn mock_without_response_errors() {
        let mock = MockCatalog::new();
        assert!(mock.fetch_catalog().is_err());
    }
}
