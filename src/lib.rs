//! # rate-bench
//!
//! Statistically sound throughput comparison of competing implementations.
//!
//! A [`Suite`] holds named candidates. It samples each one until the 95%
//! confidence interval of its operations-per-second estimate is tight enough,
//! then ranks them. The output includes:
//! - Mean rate (ops/sec) with margin of error and relative variance
//! - Rank, plus pairwise significance (non-overlapping confidence intervals)
//! - The fastest and slowest tie-sets
//! - Candidates that failed, with the phase and message
//!
//! ## Common Pitfall: Work Outside the Measured Operation
//!
//! Everything inside the candidate closure is timed. Build inputs in a
//! per-batch setup hook or before registering, not inside the closure.
//!
//! ```ignore
//! // WRONG: allocation and fill are timed with the search
//! Candidate::new("search", || make_haystack().contains(&needle));
//!
//! // CORRECT: reuse a prepared haystack
//! let haystack = make_haystack();
//! Candidate::new("search", || haystack.contains(&needle));
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use rate_bench::{RunConfig, Suite};
//!
//! let mut suite = Suite::new();
//! suite
//!     .add("format", || format!("{}", 12345))?
//!     .add("itoa", || itoa::Buffer::new().format(12345).len())?;
//!
//! let report = suite.run(RunConfig::default())?.unwrap_completed();
//! print!("{}", rate_bench::output::format_report(&report));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod cancel;
mod candidate;
mod config;
mod error;
mod events;
mod result;
mod suite;
mod types;

// Functional modules
pub mod analysis;
pub mod measurement;
pub mod output;
pub mod statistics;

// Re-exports for public API
pub use cancel::CancellationToken;
pub use candidate::{Candidate, FallibleWorkload, FnWorkload, Workload};
pub use config::{
    RunConfig, ENV_MAX_SAMPLES, ENV_MAX_TIME_MS, ENV_MIN_BATCH_US, ENV_MIN_BUDGET_MS,
    ENV_MIN_SAMPLES, ENV_TARGET_MOE_PCT,
};
pub use error::{BoxError, FailureKind, Phase, SuiteError, WorkFailure};
pub use events::{EventLog, SuiteEvent, SuiteListener};
pub use measurement::{Clock, ManualClock, MonotonicClock};
pub use result::{
    CandidateFailure, CandidateResult, CompletedCandidate, Metadata, Outcome, PartialReport,
    SuiteReport,
};
pub use statistics::Stats;
pub use suite::{Suite, SuiteState};
pub use types::Sample;

/// Compare candidates with the default configuration.
///
/// Builds a [`Suite`] timed by the monotonic clock, registers `candidates` in
/// order and runs it once.
///
/// # Errors
///
/// Fails on duplicate names or an empty candidate list.
pub fn compare<'a, I>(candidates: I) -> Result<Outcome, SuiteError>
where
    I: IntoIterator<Item = Candidate<'a>>,
{
    let mut suite = Suite::new();
    for candidate in candidates {
        suite.add_candidate(candidate)?;
    }
    suite.run(RunConfig::default())
}
