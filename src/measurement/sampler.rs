//! Adaptive sampling of a single candidate.
//!
//! The sampler first calibrates a batch size large enough that one batch
//! clears the clock's resolution by a safety factor. It then repeats timed
//! batches until the sampling budget is spent and the running margin of error
//! meets the target, or until a hard ceiling stops it.

use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::clock::Clock;
use crate::cancel::CancellationToken;
use crate::candidate::Candidate;
use crate::error::{BoxError, Phase, WorkFailure};
use crate::statistics::OnlineStats;
use crate::types::Sample;

/// A batch must last at least this many clock ticks.
pub const SAFETY_FACTOR: u32 = 10;

/// Upper bound on batch size during calibration (2^40 invocations).
pub const MAX_BATCH_SIZE: u64 = 1 << 40;

/// Limits for one candidate's sampling loop.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingPlan {
    /// Stop once the running margin of error is at or below this percentage.
    pub target_margin_of_error_pct: f64,
    /// Keep sampling for at least this long.
    pub min_sample_budget: Duration,
    /// Stop unconditionally after this long.
    pub max_total_time: Duration,
    /// Keep sampling until at least this many samples exist.
    pub min_samples: usize,
    /// Stop unconditionally at this many samples.
    pub max_samples: usize,
    /// Minimum duration of a calibrated batch.
    pub min_batch_time: Duration,
}

/// Why sampling stopped without producing samples.
#[derive(Debug)]
pub enum SampleAbort {
    /// A candidate callable failed; partial samples were discarded.
    Failed(WorkFailure),
    /// Cancellation was requested between batches.
    Cancelled,
}

impl From<WorkFailure> for SampleAbort {
    fn from(failure: WorkFailure) -> Self {
        SampleAbort::Failed(failure)
    }
}

/// Runs candidates and records timed batches.
#[derive(Debug, Clone)]
pub struct Sampler<C: Clock> {
    clock: C,
}

impl<C: Clock> Sampler<C> {
    /// Create a sampler reading time from `clock`.
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// The clock in use.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Duration a calibrated batch must reach.
    pub fn min_batch_duration(&self, plan: &SamplingPlan) -> Duration {
        (self.clock.resolution() * SAFETY_FACTOR).max(plan.min_batch_time)
    }

    /// Sample `candidate` according to `plan`.
    ///
    /// Returns the recorded samples in order. Any failure of the candidate's
    /// callables, or a cancellation observed between batches, discards the
    /// samples collected so far.
    pub fn sample(
        &self,
        candidate: &mut Candidate<'_>,
        plan: &SamplingPlan,
        cancel: &CancellationToken,
    ) -> Result<Vec<Sample>, SampleAbort> {
        let start = self.clock.now();
        let calibrated = self.calibrate(candidate, plan, cancel, start)?;
        let first = calibrated.sample;

        let mut online = OnlineStats::new();
        online.push(&first);
        let mut samples = vec![first];

        loop {
            let elapsed = self.since(start);
            if elapsed >= plan.max_total_time {
                let moe = online.margin_of_error_pct();
                if moe > plan.target_margin_of_error_pct {
                    warn!(
                        candidate = candidate.name(),
                        samples = samples.len(),
                        margin_of_error_pct = moe,
                        "time ceiling reached before target margin of error"
                    );
                }
                break;
            }
            if samples.len() >= plan.max_samples {
                debug!(candidate = candidate.name(), "sample ceiling reached");
                break;
            }
            if elapsed >= plan.min_sample_budget
                && samples.len() >= plan.min_samples
                && online.margin_of_error_pct() <= plan.target_margin_of_error_pct
            {
                break;
            }
            if cancel.is_cancelled() {
                return Err(SampleAbort::Cancelled);
            }

            let duration = self.run_batch(candidate, calibrated.size)?;
            let sample = Sample::new(duration, calibrated.size);
            online.push(&sample);
            samples.push(sample);
        }

        debug!(
            candidate = candidate.name(),
            samples = samples.len(),
            batch_size = calibrated.size,
            elapsed_ms = self.since(start).as_millis() as u64,
            "sampling finished"
        );
        Ok(samples)
    }

    /// Double the batch size until one batch clears the minimum batch duration.
    ///
    /// The clearing batch becomes the first sample; earlier batches are warm-up.
    fn calibrate(
        &self,
        candidate: &mut Candidate<'_>,
        plan: &SamplingPlan,
        cancel: &CancellationToken,
        start: Instant,
    ) -> Result<Calibrated, SampleAbort> {
        let target = self.min_batch_duration(plan);
        let mut size: u64 = 1;

        loop {
            if cancel.is_cancelled() {
                return Err(SampleAbort::Cancelled);
            }

            let duration = self.run_batch(candidate, size)?;
            let cleared = duration >= target;
            if cleared || size >= MAX_BATCH_SIZE || self.since(start) >= plan.max_total_time {
                if !cleared {
                    warn!(
                        candidate = candidate.name(),
                        batch_size = size,
                        batch_ns = duration.as_nanos() as u64,
                        target_ns = target.as_nanos() as u64,
                        "calibration stopped before batch cleared timer resolution"
                    );
                }
                debug!(candidate = candidate.name(), batch_size = size, "calibrated");
                return Ok(Calibrated {
                    size,
                    sample: Sample::new(duration, size),
                });
            }

            debug!(
                candidate = candidate.name(),
                batch_size = size,
                batch_ns = duration.as_nanos() as u64,
                "batch below resolution threshold, doubling"
            );
            size = (size * 2).min(MAX_BATCH_SIZE);
        }
    }

    /// Run one batch: setup, `size` timed invocations, teardown.
    ///
    /// Teardown runs whenever setup succeeded, including after a failed
    /// invocation. A setup hook that succeeded before the workload's own setup
    /// failed is released by the candidate itself. An invocation failure takes
    /// precedence over a teardown failure.
    fn run_batch(&self, candidate: &mut Candidate<'_>, size: u64) -> Result<Duration, WorkFailure> {
        guarded(Phase::Setup, || candidate.setup())?;

        let clock = &self.clock;
        let timed = panic::catch_unwind(AssertUnwindSafe(|| -> Result<Duration, BoxError> {
            let start = clock.now();
            for _ in 0..size {
                candidate.invoke()?;
            }
            let end = clock.now();
            Ok(clock.elapsed(start, end))
        }));

        let teardown = guarded(Phase::Teardown, || candidate.teardown());

        let duration = match timed {
            Ok(Ok(duration)) => duration,
            Ok(Err(source)) => return Err(WorkFailure::error(Phase::Invoke, source)),
            Err(payload) => return Err(WorkFailure::panic(Phase::Invoke, payload)),
        };
        teardown?;
        Ok(duration)
    }

    fn since(&self, start: Instant) -> Duration {
        self.clock.elapsed(start, self.clock.now())
    }
}

struct Calibrated {
    size: u64,
    sample: Sample,
}

/// Run a hook, converting both returned errors and panics into a `WorkFailure`.
fn guarded<F>(phase: Phase, f: F) -> Result<(), WorkFailure>
where
    F: FnOnce() -> Result<(), BoxError>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(source)) => Err(WorkFailure::error(phase, source)),
        Err(payload) => Err(WorkFailure::panic(phase, payload)),
    }
}
