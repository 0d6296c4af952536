//! Measurement infrastructure.
//!
//! This module provides:
//! - [`Clock`] implementations: the platform monotonic clock and a manual clock for tests
//! - [`Sampler`]: adaptive batch calibration and the sampling loop
//!
//! # Batch Calibration
//!
//! Timing a single call of a fast operation mostly measures clock
//! quantization. The sampler doubles the batch size until one batch lasts at
//! least [`SAFETY_FACTOR`] clock ticks (and at least the configured minimum
//! batch time), then keeps that batch size for every recorded sample.

mod clock;
mod sampler;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use sampler::{SampleAbort, Sampler, SamplingPlan, MAX_BATCH_SIZE, SAFETY_FACTOR};
