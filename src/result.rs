//! Result types produced by a suite run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Phase, WorkFailure};
use crate::statistics::Stats;

/// One ranked candidate.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateResult {
    /// Candidate name.
    pub name: String,
    /// Final statistics.
    pub stats: Stats,
    /// 1 = fastest.
    pub rank: usize,
    /// For every other ranked candidate: whether the confidence intervals are disjoint.
    pub significantly_different_from: BTreeMap<String, bool>,
}

impl CandidateResult {
    /// Whether this candidate differs significantly from `other`.
    ///
    /// Returns `None` if `other` is not a ranked candidate of the same run.
    pub fn differs_from(&self, other: &str) -> Option<bool> {
        self.significantly_different_from.get(other).copied()
    }
}

/// Statistics of a candidate that finished sampling before cancellation.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedCandidate {
    /// Candidate name.
    pub name: String,
    /// Final statistics.
    pub stats: Stats,
}

/// A candidate excluded from ranking because one of its callables failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFailure {
    /// Candidate name.
    pub name: String,
    /// Which callable failed.
    pub phase: Phase,
    /// Rendered error or panic message.
    pub message: String,
    /// Whether the failure was a panic.
    pub panicked: bool,
}

impl CandidateFailure {
    /// Summarize a failure for reporting.
    pub fn from_work_failure(name: &str, failure: &WorkFailure) -> Self {
        Self {
            name: name.to_string(),
            phase: failure.phase,
            message: failure.kind.to_string(),
            panicked: failure.is_panic(),
        }
    }
}

/// Metadata for debugging and analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    /// Clock used for timing.
    pub clock: String,
    /// Clock resolution in nanoseconds.
    pub clock_resolution_ns: f64,
    /// Total wall time of the run in seconds.
    pub runtime_secs: f64,
}

/// Full result of a run that sampled every candidate.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    /// Ranked candidates, fastest first.
    pub results: Vec<CandidateResult>,
    /// The winner, or the tie-set indistinguishable from rank 1.
    pub fastest: Vec<String>,
    /// The loser, or the tie-set indistinguishable from the last rank.
    pub slowest: Vec<String>,
    /// Candidates that failed, in registration order.
    pub failures: Vec<CandidateFailure>,
    /// Run metadata.
    pub metadata: Metadata,
}

impl SuiteReport {
    /// Look up a ranked candidate by name.
    pub fn get(&self, name: &str) -> Option<&CandidateResult> {
        self.results.iter().find(|r| r.name == name)
    }

    /// Whether a single candidate is significantly faster than all others.
    pub fn has_clear_winner(&self) -> bool {
        self.fastest.len() == 1 && self.results.len() > 1
    }
}

/// Result of a run stopped by cancellation.
#[derive(Debug, Clone, Serialize)]
pub struct PartialReport {
    /// Candidates that finished sampling, in registration order.
    pub completed: Vec<CompletedCandidate>,
    /// Candidates that failed before cancellation, in registration order.
    pub failures: Vec<CandidateFailure>,
    /// The candidate whose sampling was interrupted, if any.
    pub interrupted: Option<String>,
    /// Candidates that never started.
    pub skipped: Vec<String>,
    /// Run metadata.
    pub metadata: Metadata,
}

impl PartialReport {
    /// Look up a completed candidate by name.
    pub fn get(&self, name: &str) -> Option<&CompletedCandidate> {
        self.completed.iter().find(|c| c.name == name)
    }
}

/// Top-level outcome of a suite run.
#[derive(Debug, Clone, Serialize)]
pub enum Outcome {
    /// Every candidate was sampled (or failed) and the results are ranked.
    Completed(SuiteReport),
    /// Cancellation stopped the run early.
    Cancelled(PartialReport),
}

impl Outcome {
    /// Whether the run completed.
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    /// Returns the report if completed, `None` if cancelled.
    pub fn completed(self) -> Option<SuiteReport> {
        match self {
            Outcome::Completed(report) => Some(report),
            Outcome::Cancelled(_) => None,
        }
    }

    /// Returns the partial report if cancelled, `None` if completed.
    pub fn cancelled(self) -> Option<PartialReport> {
        match self {
            Outcome::Completed(_) => None,
            Outcome::Cancelled(partial) => Some(partial),
        }
    }

    /// Unwrap a completed report, panicking if the run was cancelled.
    pub fn unwrap_completed(self) -> SuiteReport {
        match self {
            Outcome::Completed(report) => report,
            Outcome::Cancelled(partial) => panic!(
                "suite run was cancelled after {} candidate(s)",
                partial.completed.len()
            ),
        }
    }
}
