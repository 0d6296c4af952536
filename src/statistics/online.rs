//! Streaming statistics using Welford's algorithm.
//!
//! The sampler consults the running margin of error after every batch;
//! recomputing from scratch would make a long run quadratic.

use super::summary::Stats;
use crate::types::Sample;

/// Online accumulator of sample rates.
///
/// Produces the same [`Stats`] as [`Stats::from_samples`] over the pushed
/// samples, up to floating-point rounding.
#[derive(Debug, Clone, Default)]
pub struct OnlineStats {
    /// Number of samples seen.
    count: usize,
    /// Running mean rate.
    mean: f64,
    /// Sum of squared deviations from the current mean.
    m2: f64,
}

impl OnlineStats {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one sample's rate.
    pub fn push(&mut self, sample: &Sample) {
        self.update(sample.rate());
    }

    /// Add a raw rate observation.
    pub fn update(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = x - self.mean;
        self.m2 += delta * delta2;
    }

    /// Number of observations.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Current mean rate.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Current sample variance (0 when fewer than two observations).
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Current margin of error in percent (infinite while unbounded).
    pub fn margin_of_error_pct(&self) -> f64 {
        self.snapshot().margin_of_error_pct
    }

    /// Full statistics for the observations so far.
    pub fn snapshot(&self) -> Stats {
        Stats::from_moments(self.count, self.mean, self.variance())
    }
}
