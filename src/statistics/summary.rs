//! Reduction of raw samples to per-candidate statistics.

use serde::Serialize;

use super::t_table::t_critical_95;
use crate::types::Sample;

/// Throughput statistics for one candidate.
///
/// All rates are in invocations per second. Margins are half-widths of the
/// 95% confidence interval around `mean_rate`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stats {
    /// Arithmetic mean of the per-sample rates (ops/sec).
    pub mean_rate: f64,
    /// Mean time per invocation in seconds (`1 / mean_rate`).
    pub mean_period_secs: f64,
    /// Bessel-corrected sample variance of the rates.
    pub variance: f64,
    /// Sample standard deviation of the rates.
    pub std_dev: f64,
    /// Standard error of the mean.
    pub standard_error: f64,
    /// Absolute margin of error in ops/sec. Infinite when unbounded.
    pub margin_of_error: f64,
    /// Margin of error as a percentage of the mean. Infinite when unbounded.
    pub margin_of_error_pct: f64,
    /// Coefficient of variation, in percent.
    pub relative_variance_pct: f64,
    /// Number of samples reduced.
    pub sample_count: usize,
}

impl Stats {
    /// Compute statistics from a sample sequence.
    ///
    /// Each sample contributes one throughput observation regardless of its
    /// batch size. This is a pure function of `samples`.
    pub fn from_samples(samples: &[Sample]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self::from_moments(0, 0.0, 0.0);
        }

        let rates: Vec<f64> = samples.iter().map(Sample::rate).collect();
        let mean = rates.iter().sum::<f64>() / n as f64;
        let variance = if n < 2 {
            0.0
        } else {
            rates.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        };

        Self::from_moments(n, mean, variance)
    }

    /// Derive the full statistics from count, mean, and sample variance.
    pub fn from_moments(sample_count: usize, mean_rate: f64, variance: f64) -> Self {
        let variance = if sample_count < 2 { 0.0 } else { variance.max(0.0) };
        let std_dev = variance.sqrt();
        let standard_error = if sample_count == 0 {
            0.0
        } else {
            std_dev / (sample_count as f64).sqrt()
        };

        let bounded = sample_count >= 2 && mean_rate > 0.0;
        let (margin_of_error, margin_of_error_pct) = if bounded {
            let moe = standard_error * t_critical_95(sample_count - 1);
            (moe, moe / mean_rate * 100.0)
        } else {
            (f64::INFINITY, f64::INFINITY)
        };

        let relative_variance_pct = if sample_count >= 2 && mean_rate > 0.0 {
            std_dev / mean_rate * 100.0
        } else {
            0.0
        };

        let mean_period_secs = if mean_rate > 0.0 { 1.0 / mean_rate } else { 0.0 };

        Self {
            mean_rate,
            mean_period_secs,
            variance,
            std_dev,
            standard_error,
            margin_of_error,
            margin_of_error_pct,
            relative_variance_pct,
            sample_count,
        }
    }

    /// Whether the margin of error is finite.
    pub fn is_bounded(&self) -> bool {
        self.margin_of_error.is_finite()
    }

    /// Lower and upper bounds of the 95% confidence interval.
    pub fn interval(&self) -> (f64, f64) {
        (
            self.mean_rate - self.margin_of_error,
            self.mean_rate + self.margin_of_error,
        )
    }
}
