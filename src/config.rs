//! Configuration for a suite run.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::SuiteError;
use crate::measurement::SamplingPlan;

/// Environment variable overriding [`RunConfig::target_margin_of_error_pct`].
pub const ENV_TARGET_MOE_PCT: &str = "RATE_BENCH_TARGET_MOE_PCT";
/// Environment variable overriding [`RunConfig::min_sample_budget_ms`].
pub const ENV_MIN_BUDGET_MS: &str = "RATE_BENCH_MIN_BUDGET_MS";
/// Environment variable overriding [`RunConfig::max_total_time_ms`].
pub const ENV_MAX_TIME_MS: &str = "RATE_BENCH_MAX_TIME_MS";
/// Environment variable overriding [`RunConfig::min_samples`].
pub const ENV_MIN_SAMPLES: &str = "RATE_BENCH_MIN_SAMPLES";
/// Environment variable overriding [`RunConfig::max_samples`].
pub const ENV_MAX_SAMPLES: &str = "RATE_BENCH_MAX_SAMPLES";
/// Environment variable overriding [`RunConfig::min_batch_time_us`].
pub const ENV_MIN_BATCH_US: &str = "RATE_BENCH_MIN_BATCH_US";

/// Options controlling how long and how precisely each candidate is sampled.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Stop once the margin of error falls to this percentage (default: 1.0).
    pub target_margin_of_error_pct: f64,

    /// Always sample each candidate for at least this long (default: 1,000 ms).
    pub min_sample_budget_ms: u64,

    /// Hard ceiling on sampling time per candidate (default: 10,000 ms).
    ///
    /// Sampling stops here even if the target margin was never reached;
    /// the reported margin then shows the lower confidence.
    pub max_total_time_ms: u64,

    /// Minimum number of samples before the margin target may stop sampling (default: 5).
    pub min_samples: usize,

    /// Hard ceiling on samples per candidate (default: 100,000).
    pub max_samples: usize,

    /// Minimum duration of one timed batch in microseconds (default: 1,000).
    ///
    /// Calibration doubles the batch size until a batch lasts at least this
    /// long and at least ten clock ticks.
    pub min_batch_time_us: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            target_margin_of_error_pct: 1.0,
            min_sample_budget_ms: 1_000,
            max_total_time_ms: 10_000,
            min_samples: 5,
            max_samples: 100_000,
            min_batch_time_us: 1_000,
        }
    }
}

impl RunConfig {
    /// Fast configuration for tests and demos.
    ///
    /// Settings:
    /// - 5% target margin (vs 1% default)
    /// - 50 ms minimum budget (vs 1,000 ms default)
    /// - 500 ms ceiling (vs 10,000 ms default)
    /// - 100 µs batches (vs 1,000 µs default)
    pub fn quick() -> Self {
        Self {
            target_margin_of_error_pct: 5.0,
            min_sample_budget_ms: 50,
            max_total_time_ms: 500,
            min_batch_time_us: 100,
            ..Self::default()
        }
    }

    /// Set the target margin of error in percent.
    pub fn target_margin_of_error_pct(mut self, pct: f64) -> Self {
        self.target_margin_of_error_pct = pct;
        self
    }

    /// Set the minimum sampling budget in milliseconds.
    pub fn min_sample_budget_ms(mut self, ms: u64) -> Self {
        self.min_sample_budget_ms = ms;
        self
    }

    /// Set the per-candidate time ceiling in milliseconds.
    pub fn max_total_time_ms(mut self, ms: u64) -> Self {
        self.max_total_time_ms = ms;
        self
    }

    /// Set the minimum sample count.
    pub fn min_samples(mut self, n: usize) -> Self {
        self.min_samples = n;
        self
    }

    /// Set the per-candidate sample ceiling.
    pub fn max_samples(mut self, n: usize) -> Self {
        self.max_samples = n;
        self
    }

    /// Set the minimum batch duration in microseconds.
    pub fn min_batch_time_us(mut self, us: u64) -> Self {
        self.min_batch_time_us = us;
        self
    }

    /// Default configuration with `RATE_BENCH_*` environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().env_overrides()
    }

    /// Merge overrides from `RATE_BENCH_*` environment variables.
    ///
    /// Unset variables leave the field untouched; unparsable ones are
    /// ignored with a warning.
    pub fn env_overrides(mut self) -> Self {
        if let Some(pct) = parse_env(ENV_TARGET_MOE_PCT) {
            self.target_margin_of_error_pct = pct;
        }
        if let Some(ms) = parse_env(ENV_MIN_BUDGET_MS) {
            self.min_sample_budget_ms = ms;
        }
        if let Some(ms) = parse_env(ENV_MAX_TIME_MS) {
            self.max_total_time_ms = ms;
        }
        if let Some(n) = parse_env(ENV_MIN_SAMPLES) {
            self.min_samples = n;
        }
        if let Some(n) = parse_env(ENV_MAX_SAMPLES) {
            self.max_samples = n;
        }
        if let Some(us) = parse_env(ENV_MIN_BATCH_US) {
            self.min_batch_time_us = us;
        }
        self
    }

    /// Check that the options describe a terminating, meaningful run.
    pub fn validate(&self) -> Result<(), SuiteError> {
        let invalid = |msg: String| Err(SuiteError::InvalidConfig(msg));

        if !self.target_margin_of_error_pct.is_finite() || self.target_margin_of_error_pct < 0.0 {
            return invalid(format!(
                "target_margin_of_error_pct must be a non-negative number, got {}",
                self.target_margin_of_error_pct
            ));
        }
        if self.max_total_time_ms == 0 {
            return invalid("max_total_time_ms must be positive".to_string());
        }
        if self.min_sample_budget_ms > self.max_total_time_ms {
            return invalid(format!(
                "min_sample_budget_ms ({}) exceeds max_total_time_ms ({})",
                self.min_sample_budget_ms, self.max_total_time_ms
            ));
        }
        if self.min_samples == 0 {
            return invalid("min_samples must be at least 1".to_string());
        }
        if self.max_samples < self.min_samples {
            return invalid(format!(
                "max_samples ({}) is below min_samples ({})",
                self.max_samples, self.min_samples
            ));
        }
        Ok(())
    }

    /// Sampler limits derived from this configuration.
    pub fn sampling_plan(&self) -> SamplingPlan {
        SamplingPlan {
            target_margin_of_error_pct: self.target_margin_of_error_pct,
            min_sample_budget: Duration::from_millis(self.min_sample_budget_ms),
            max_total_time: Duration::from_millis(self.max_total_time_ms),
            min_samples: self.min_samples,
            max_samples: self.max_samples,
            min_batch_time: Duration::from_micros(self.min_batch_time_us),
        }
    }
}

fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable environment override");
            None
        }
    }
}
