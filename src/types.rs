//! Common measurement types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Shortest duration used when converting a sample to a rate.
///
/// A batch that measured as zero is treated as one nanosecond so the rate stays finite.
pub const MIN_SAMPLE_DURATION: Duration = Duration::from_nanos(1);

/// One timed batch: `batch_size` consecutive invocations that took `duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Elapsed time of the whole batch.
    pub duration: Duration,
    /// Number of work-function invocations in the batch.
    pub batch_size: u64,
}

impl Sample {
    /// Create a new sample.
    pub fn new(duration: Duration, batch_size: u64) -> Self {
        Self {
            duration,
            batch_size,
        }
    }

    /// Observed throughput in invocations per second.
    pub fn rate(&self) -> f64 {
        let secs = self.duration.max(MIN_SAMPLE_DURATION).as_secs_f64();
        self.batch_size as f64 / secs
    }
}
