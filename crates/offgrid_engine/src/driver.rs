//! Pluggable transfer pacing.

use std::time::Duration;

/// Drives the progress checkpoints of a single record transfer.
///
/// The engine walks [`checkpoints`](TransferDriver::checkpoints) in
/// order, calling [`pace`](TransferDriver::pace) between them. Each gap
/// between checkpoints is a suspension point where the engine observes
/// cancellation. A real chunked network transfer implements this trait
/// by reporting actual chunk boundaries; the state machine does not
/// change.
pub trait TransferDriver: Send + Sync {
    /// The progress checkpoints for one record, strictly increasing and
    /// ending at 100.
    fn checkpoints(&self) -> Vec<u8>;

    /// Blocks for the pacing interval before the next checkpoint.
    fn pace(&self);
}

/// A simulated transfer with fixed checkpoint step and pacing delay.
///
/// Stands in for a chunked-transfer protocol; the defaults (step 20,
/// 150 ms) give visible incremental progress.
#[derive(Debug, Clone)]
pub struct SimulatedDriver {
    step: u8,
    delay: Duration,
}

impl SimulatedDriver {
    /// Creates a driver advancing by `step` percent per checkpoint with
    /// `delay` between checkpoints. A zero step is treated as one jump
    /// to 100.
    #[must_use]
    pub fn new(step: u8, delay: Duration) -> Self {
        Self { step, delay }
    }
}

impl Default for SimulatedDriver {
    fn default() -> Self {
        Self::new(20, Duration::from_millis(150))
    }
}

impl TransferDriver for SimulatedDriver {
    fn checkpoints(&self) -> Vec<u8> {
        if self.step == 0 || self.step >= 100 {
            return vec![100];
        }
        let mut points: Vec<u8> = (self.step..100).step_by(self.step as usize).collect();
        points.push(100);
        points
    }

    fn pace(&self) {
        std::thread::sleep(self.delay);
    }
}

/// A driver with no pacing delay, for tests.
#[derive(Debug, Clone, Default)]
pub struct InstantDriver;

impl TransferDriver for InstantDriver {
    fn checkpoints(&self) -> Vec<u8> {
        vec![25, 50, 75, 100]
    }

    fn pace(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_checkpoints_end_at_100() {
        let driver = SimulatedDriver::new(20, Duration::ZERO);
        assert_eq!(driver.checkpoints(), vec![20, 40, 60, 80, 100]);
    }

    #[test]
    fn uneven_step_still_ends_at_100() {
        let driver = SimulatedDriver::new(30, Duration::ZERO);
        assert_eq!(driver.checkpoints(), vec![30, 60, 90, 100]);
    }

    #[test]
    fn degenerate_steps_are_one_jump() {
        assert_eq!(SimulatedDriver::new(0, Duration::ZERO).checkpoints(), vec![100]);
        assert_eq!(
            SimulatedDriver::new(100, Duration::ZERO).checkpoints(),
            vec![100]
        );
    }

    #[test]
    fn checkpoints_are_strictly_increasing() {
        for step in [7, 20, 33, 50, 99] {
            let points = SimulatedDriver::new(step, Duration::ZERO).checkpoints();
            assert!(points.windows(2).all(|w| w[0] < w[1]), "step {step}");
            assert_eq!(*points.last().unwrap(), 100, "step {step}");
        }
    }
}
