//! Lifecycle events emitted while a suite runs.
//!
//! Listeners are called synchronously on the running thread, in this order:
//! - `on_candidate_start` for each candidate, in registration order
//! - then exactly one of `on_cycle` (sampled) or `on_candidate_failed`
//! - finally exactly one of `on_complete` or `on_cancelled`
//!
//! A listener that wants to stop the run can trip the suite's
//! [`CancellationToken`](crate::CancellationToken); the suite observes it
//! before the next candidate starts.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::error::WorkFailure;
use crate::result::{CandidateFailure, PartialReport, SuiteReport};
use crate::statistics::Stats;

/// Receives suite lifecycle events. Every method defaults to a no-op.
pub trait SuiteListener {
    /// A candidate is about to be sampled.
    fn on_candidate_start(&mut self, name: &str) {
        let _ = name;
    }

    /// A candidate finished sampling.
    fn on_cycle(&mut self, name: &str, stats: &Stats) {
        let _ = (name, stats);
    }

    /// A candidate's callable failed; it is excluded from ranking.
    fn on_candidate_failed(&mut self, name: &str, failure: &WorkFailure) {
        let _ = (name, failure);
    }

    /// Every candidate has been processed and ranked.
    fn on_complete(&mut self, report: &SuiteReport) {
        let _ = report;
    }

    /// The run was cancelled.
    fn on_cancelled(&mut self, partial: &PartialReport) {
        let _ = partial;
    }
}

/// An owned copy of one listener callback.
#[derive(Debug, Clone, Serialize)]
pub enum SuiteEvent {
    /// See [`SuiteListener::on_candidate_start`].
    CandidateStart {
        /// Candidate name.
        name: String,
    },
    /// See [`SuiteListener::on_cycle`].
    Cycle {
        /// Candidate name.
        name: String,
        /// Final statistics.
        stats: Stats,
    },
    /// See [`SuiteListener::on_candidate_failed`].
    CandidateFailed(CandidateFailure),
    /// See [`SuiteListener::on_complete`].
    Complete(SuiteReport),
    /// See [`SuiteListener::on_cancelled`].
    Cancelled(PartialReport),
}

impl SuiteEvent {
    /// The candidate this event concerns, if any.
    pub fn candidate(&self) -> Option<&str> {
        match self {
            SuiteEvent::CandidateStart { name } | SuiteEvent::Cycle { name, .. } => Some(name),
            SuiteEvent::CandidateFailed(failure) => Some(&failure.name),
            SuiteEvent::Complete(_) | SuiteEvent::Cancelled(_) => None,
        }
    }

    /// Whether this event ends the run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SuiteEvent::Complete(_) | SuiteEvent::Cancelled(_))
    }
}

/// Forward each callback as a [`SuiteEvent`] into a channel.
///
/// Send errors (the receiver was dropped) are ignored.
impl SuiteListener for Sender<SuiteEvent> {
    fn on_candidate_start(&mut self, name: &str) {
        let _ = self.send(SuiteEvent::CandidateStart {
            name: name.to_string(),
        });
    }

    fn on_cycle(&mut self, name: &str, stats: &Stats) {
        let _ = self.send(SuiteEvent::Cycle {
            name: name.to_string(),
            stats: *stats,
        });
    }

    fn on_candidate_failed(&mut self, name: &str, failure: &WorkFailure) {
        let _ = self.send(SuiteEvent::CandidateFailed(
            CandidateFailure::from_work_failure(name, failure),
        ));
    }

    fn on_complete(&mut self, report: &SuiteReport) {
        let _ = self.send(SuiteEvent::Complete(report.clone()));
    }

    fn on_cancelled(&mut self, partial: &PartialReport) {
        let _ = self.send(SuiteEvent::Cancelled(partial.clone()));
    }
}

/// Records every event in memory.
///
/// Clones share the same log, so one clone can be handed to the suite and
/// the other inspected after the run.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<SuiteEvent>>>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events.
    pub fn events(&self) -> Vec<SuiteEvent> {
        self.lock().clone()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record(&self, event: SuiteEvent) {
        self.lock().push(event);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<SuiteEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SuiteListener for EventLog {
    fn on_candidate_start(&mut self, name: &str) {
        self.record(SuiteEvent::CandidateStart {
            name: name.to_string(),
        });
    }

    fn on_cycle(&mut self, name: &str, stats: &Stats) {
        self.record(SuiteEvent::Cycle {
            name: name.to_string(),
            stats: *stats,
        });
    }

    fn on_candidate_failed(&mut self, name: &str, failure: &WorkFailure) {
        self.record(SuiteEvent::CandidateFailed(
            CandidateFailure::from_work_failure(name, failure),
        ));
    }

    fn on_complete(&mut self, report: &SuiteReport) {
        self.record(SuiteEvent::Complete(report.clone()));
    }

    fn on_cancelled(&mut self, partial: &PartialReport) {
        self.record(SuiteEvent::Cancelled(partial.clone()));
    }
}
