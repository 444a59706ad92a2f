//! Timeout and fallback decorator for catalog sources.

use crate::error::{CatalogError, CatalogResult};
use crate::source::CatalogSource;
use crate::r#static::StaticCatalog;
use offgrid_model::Record;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::warn;

/// Default bound on how long a catalog fetch may run.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(2);

/// A catalog source that never fails.
///
/// Wraps an inner source with a bounded timeout and degrades to a fixed
/// fallback catalog when the inner fetch errors or does not finish in
/// time. Connectivity problems are logged, not propagated; the engine
/// always receives a usable catalog.
pub struct ResilientCatalog<S> {
    inner: Arc<S>,
    fallback: Vec<Record>,
    timeout: Duration,
}

impl<S: CatalogSource + 'static> ResilientCatalog<S> {
    /// Wraps `inner` with the default timeout and the built-in fallback
    /// catalog.
    pub fn new(inner: S) -> Self {
        Self {
            inner: Arc::new(inner),
            fallback: StaticCatalog::builtin().records().to_vec(),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Sets the fetch timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replaces the fallback catalog.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Vec<Record>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Runs the inner fetch on a worker thread, bounded by the timeout.
    ///
    /// A fetch that outlives the timeout keeps running on its thread but
    /// its result is discarded; the send into a dropped channel is a
    /// no-op.
    fn fetch_bounded(&self) -> CatalogResult<Vec<Record>> {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        thread::spawn(move || {
            let _ = tx.send(inner.fetch_catalog());
        });

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(_) => Err(CatalogError::Timeout {
                waited: self.timeout,
            }),
        }
    }
}

impl<S: CatalogSource + 'static> CatalogSource for ResilientCatalog<S> {
    fn fetch_catalog(&self) -> CatalogResult<Vec<Record>> {
        match self.fetch_bounded() {
            Ok(records) => Ok(records),
            Err(err) => {
                warn!(error = %err, "remote catalog unavailable, serving fallback");
                Ok(self.fallback.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockCatalog;

    #[test]
    fn passes_through_healthy_source() {
        let records = vec![Record::new("R1", "t", "SYSTEM", "c", "2024-05-10", 1)];
        let mock = MockCatalog::new();
        mock.set_response(records.clone());

        let catalog = ResilientCatalog::new(mock);
        assert_eq!(catalog.fetch_catalog().unwrap(), records);
    }

    #[test]
    fn degrades_to_fallback_on_failure() {
        let mock = MockCatalog::new();
        mock.set_available(false);

        let catalog = ResilientCatalog::new(mock);
        let records = catalog.fetch_catalog().unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(records[0].id, "DATA-001");
    }

    #[test]
    fn degrades_to_fallback_on_timeout() {
        let mock = MockCatalog::new();
        mock.set_response(vec![]);
        mock.set_latency(Duration::from_millis(100));

        let fallback = vec![Record::new("FB-1", "t", "SYSTEM", "c", "2024-05-10", 1)];
        let catalog = ResilientCatalog::new(mock)
            .with_timeout(Duration::from_millis(10))
            .with_fallback(fallback.clone());

        assert_eq!(catalog.fetch_catalog().unwrap(), fallback);
    }

    #[test]
    fn custom_fallback_replaces_builtin() {
        let mock = MockCatalog::new();
        mock.set_available(false);

        let fallback = vec![Record::new("FB-1", "t", "SYSTEM", "c", "2024-05-10", 1)];
        let catalog = ResilientCatalog::new(mock).with_fallback(fallback.clone());
        assert_eq!(catalog.fetch_catalog().unwrap(), fallback);
    }
}
