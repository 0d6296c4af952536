//! The [`Suite`]: an ordered set of candidates run once and compared.

use std::fmt;

use tracing::{debug, info, info_span, warn};

use crate::analysis;
use crate::cancel::CancellationToken;
use crate::candidate::Candidate;
use crate::config::RunConfig;
use crate::error::SuiteError;
use crate::events::SuiteListener;
use crate::measurement::{Clock, MonotonicClock, SampleAbort, Sampler};
use crate::result::{
    CandidateFailure, CompletedCandidate, Metadata, Outcome, PartialReport, SuiteReport,
};
use crate::statistics::Stats;

/// Lifecycle state of a [`Suite`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteState {
    /// No candidates registered.
    Empty,
    /// At least one candidate registered; ready to run.
    Populated,
    /// `run` is in progress.
    Running,
    /// `run` finished and ranked every candidate.
    Completed,
    /// `run` was stopped by cancellation.
    Cancelled,
}

/// Compares candidates by throughput.
///
/// # Example
///
/// ```ignore
/// use rate_bench::{RunConfig, Suite};
///
/// let mut suite = Suite::new();
/// suite
///     .add("sort", || data.clone().sort())?
///     .add("sort_unstable", || data.clone().sort_unstable())?;
///
/// let report = suite.run(RunConfig::default())?.unwrap_completed();
/// println!("fastest: {:?}", report.fastest);
/// ```
///
/// A suite runs once. Construct a new one to measure again.
pub struct Suite<'a, C: Clock = MonotonicClock> {
    candidates: Vec<Candidate<'a>>,
    listeners: Vec<Box<dyn SuiteListener + 'a>>,
    sampler: Sampler<C>,
    cancel: CancellationToken,
    state: SuiteState,
}

impl<'a> Suite<'a> {
    /// Create an empty suite timed by the platform monotonic clock.
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }
}

impl Default for Suite<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, C: Clock> Suite<'a, C> {
    /// Create an empty suite timed by `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self {
            candidates: Vec::new(),
            listeners: Vec::new(),
            sampler: Sampler::new(clock),
            cancel: CancellationToken::new(),
            state: SuiteState::Empty,
        }
    }

    /// Register a candidate.
    ///
    /// Fails with [`SuiteError::DuplicateName`] if the name is taken and with
    /// [`SuiteError::AlreadyRun`] once the suite has run. The candidate list
    /// is unchanged on failure.
    pub fn add_candidate(&mut self, candidate: Candidate<'a>) -> Result<(), SuiteError> {
        if !matches!(self.state, SuiteState::Empty | SuiteState::Populated) {
            return Err(SuiteError::AlreadyRun);
        }
        if self.candidates.iter().any(|c| c.name() == candidate.name()) {
            return Err(SuiteError::DuplicateName {
                name: candidate.name().to_string(),
            });
        }
        self.candidates.push(candidate);
        self.state = SuiteState::Populated;
        Ok(())
    }

    /// Register an infallible closure as a candidate.
    pub fn add<F, T>(&mut self, name: impl Into<String>, work: F) -> Result<&mut Self, SuiteError>
    where
        F: FnMut() -> T + 'a,
    {
        self.add_candidate(Candidate::new(name, work))?;
        Ok(self)
    }

    /// Attach a listener. Listeners are notified in attachment order.
    pub fn add_listener<L>(&mut self, listener: L) -> &mut Self
    where
        L: SuiteListener + 'a,
    {
        self.listeners.push(Box::new(listener));
        self
    }

    /// A handle that stops the run when cancelled.
    ///
    /// The suite checks it between candidates and the sampler between
    /// batches. It may be tripped from another thread or from a listener.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SuiteState {
        self.state
    }

    /// Registered candidate names, in registration order.
    pub fn candidate_names(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.name()).collect()
    }

    /// Number of registered candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether no candidates are registered.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Sample every candidate in registration order and rank the results.
    ///
    /// Candidates whose callables fail are reported and excluded from the
    /// ranking; the run continues with the next one. Cancellation yields
    /// [`Outcome::Cancelled`] with whatever finished.
    ///
    /// # Errors
    ///
    /// - [`SuiteError::NoCandidates`] if nothing is registered
    /// - [`SuiteError::AlreadyRun`] if the suite has already run
    /// - [`SuiteError::InvalidConfig`] if `config` fails validation
    pub fn run(&mut self, config: RunConfig) -> Result<Outcome, SuiteError> {
        match self.state {
            SuiteState::Empty => return Err(SuiteError::NoCandidates),
            SuiteState::Populated => {}
            SuiteState::Running | SuiteState::Completed | SuiteState::Cancelled => {
                return Err(SuiteError::AlreadyRun)
            }
        }
        config.validate()?;
        self.state = SuiteState::Running;

        let span = info_span!("suite", candidates = self.candidates.len());
        let _guard = span.enter();

        let plan = config.sampling_plan();
        let clock = self.sampler.clock();
        let started = clock.now();
        debug!(
            clock = clock.name(),
            resolution_ns = clock.resolution().as_nanos() as u64,
            ?plan,
            "starting run"
        );

        let mut completed: Vec<(String, Stats)> = Vec::new();
        let mut failures: Vec<CandidateFailure> = Vec::new();

        for index in 0..self.candidates.len() {
            if self.cancel.is_cancelled() {
                let skipped = self.names_from(index);
                let partial = self.partial_report(completed, failures, None, skipped, started);
                return Ok(self.finish_cancelled(partial));
            }

            let candidate = &mut self.candidates[index];
            let name = candidate.name().to_string();
            info!(candidate = %name, "sampling");
            notify(&mut self.listeners, |l| l.on_candidate_start(&name));

            match self.sampler.sample(candidate, &plan, &self.cancel) {
                Ok(samples) => {
                    let stats = Stats::from_samples(&samples);
                    info!(
                        candidate = %name,
                        ops_per_sec = stats.mean_rate,
                        margin_of_error_pct = stats.margin_of_error_pct,
                        samples = stats.sample_count,
                        "sampled"
                    );
                    notify(&mut self.listeners, |l| l.on_cycle(&name, &stats));
                    completed.push((name, stats));
                }
                Err(SampleAbort::Failed(failure)) => {
                    warn!(candidate = %name, error = %failure, "candidate failed");
                    notify(&mut self.listeners, |l| l.on_candidate_failed(&name, &failure));
                    failures.push(CandidateFailure::from_work_failure(&name, &failure));
                }
                Err(SampleAbort::Cancelled) => {
                    let skipped = self.names_from(index + 1);
                    let partial =
                        self.partial_report(completed, failures, Some(name), skipped, started);
                    return Ok(self.finish_cancelled(partial));
                }
            }
        }

        let ranking = analysis::rank(completed);
        let report = SuiteReport {
            results: ranking.results,
            fastest: ranking.fastest,
            slowest: ranking.slowest,
            failures,
            metadata: self.metadata(started),
        };

        self.state = SuiteState::Completed;
        info!(
            fastest = ?report.fastest,
            failed = report.failures.len(),
            runtime_secs = report.metadata.runtime_secs,
            "run complete"
        );
        notify(&mut self.listeners, |l| l.on_complete(&report));
        Ok(Outcome::Completed(report))
    }

    fn names_from(&self, index: usize) -> Vec<String> {
        self.candidates[index..]
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    fn partial_report(
        &self,
        completed: Vec<(String, Stats)>,
        failures: Vec<CandidateFailure>,
        interrupted: Option<String>,
        skipped: Vec<String>,
        started: std::time::Instant,
    ) -> PartialReport {
        PartialReport {
            completed: completed
                .into_iter()
                .map(|(name, stats)| CompletedCandidate { name, stats })
                .collect(),
            failures,
            interrupted,
            skipped,
            metadata: self.metadata(started),
        }
    }

    fn finish_cancelled(&mut self, partial: PartialReport) -> Outcome {
        self.state = SuiteState::Cancelled;
        warn!(
            completed = partial.completed.len(),
            interrupted = ?partial.interrupted,
            skipped = partial.skipped.len(),
            "run cancelled"
        );
        notify(&mut self.listeners, |l| l.on_cancelled(&partial));
        Outcome::Cancelled(partial)
    }

    fn metadata(&self, started: std::time::Instant) -> Metadata {
        let clock = self.sampler.clock();
        Metadata {
            clock: clock.name().to_string(),
            clock_resolution_ns: clock.resolution().as_nanos() as f64,
            runtime_secs: clock.elapsed(started, clock.now()).as_secs_f64(),
        }
    }
}

impl<C: Clock> fmt::Debug for Suite<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suite")
            .field("candidates", &self.candidate_names())
            .field("listeners", &self.listeners.len())
            .field("state", &self.state)
            .finish()
    }
}

fn notify<'a, F>(listeners: &mut [Box<dyn SuiteListener + 'a>], mut f: F)
where
    F: FnMut(&mut (dyn SuiteListener + 'a)),
{
    for listener in listeners.iter_mut() {
        f(listener.as_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Phase;
    use crate::events::{EventLog, SuiteEvent};
    use crate::measurement::ManualClock;
    use std::time::Duration;

    fn quick() -> RunConfig {
        RunConfig::quick()
    }

    #[test]
    fn test_new_suite_is_empty() {
        let mut suite = Suite::with_clock(ManualClock::new());
        assert_eq!(suite.state(), SuiteState::Empty);
        assert!(suite.is_empty());
        assert!(matches!(suite.run(quick()), Err(SuiteError::NoCandidates)));
        assert_eq!(suite.state(), SuiteState::Empty);
    }

    #[test]
    fn test_duplicate_name_leaves_list_unchanged() {
        let mut suite = Suite::with_clock(ManualClock::new());
        suite.add("parse", || 1).unwrap();
        let err = suite.add("parse", || 2).unwrap_err();
        match err {
            SuiteError::DuplicateName { name } => assert_eq!(name, "parse"),
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(suite.candidate_names(), vec!["parse"]);
        assert_eq!(suite.state(), SuiteState::Populated);
    }

    #[test]
    fn test_fast_beats_slow() {
        let clock = ManualClock::new();
        let fast_tick = clock.clone();
        let slow_tick = clock.clone();
        let mut suite = Suite::with_clock(clock);
        suite
            .add("slow", || slow_tick.advance(Duration::from_millis(5)))
            .unwrap()
            .add("fast", || fast_tick.advance(Duration::from_micros(1)))
            .unwrap();

        let report = suite.run(quick()).unwrap().unwrap_completed();

        assert_eq!(suite.state(), SuiteState::Completed);
        assert_eq!(report.fastest, vec!["fast"]);
        assert_eq!(report.slowest, vec!["slow"]);
        let fast = report.get("fast").unwrap();
        assert_eq!(fast.rank, 1);
        assert_eq!(fast.differs_from("slow"), Some(true));
        assert!((fast.stats.mean_rate - 1_000_000.0).abs() < 1e-3);
        assert!((report.get("slow").unwrap().stats.mean_rate - 200.0).abs() < 1e-9);
        assert_eq!(report.metadata.clock, "manual");
    }

    #[test]
    fn test_run_twice_fails() {
        let clock = ManualClock::new();
        let tick = clock.clone();
        let mut suite = Suite::with_clock(clock);
        suite.add("only", || tick.advance(Duration::from_micros(20))).unwrap();

        assert!(suite.run(quick()).is_ok());
        assert!(matches!(suite.run(quick()), Err(SuiteError::AlreadyRun)));
        assert!(matches!(
            suite.add("late", || ()),
            Err(SuiteError::AlreadyRun)
        ));
        assert_eq!(suite.len(), 1);
    }

    #[test]
    fn test_invalid_config_leaves_suite_runnable() {
        let clock = ManualClock::new();
        let tick = clock.clone();
        let mut suite = Suite::with_clock(clock);
        suite.add("only", || tick.advance(Duration::from_micros(20))).unwrap();

        let bad = quick().min_samples(0);
        assert!(matches!(suite.run(bad), Err(SuiteError::InvalidConfig(_))));
        assert_eq!(suite.state(), SuiteState::Populated);
        assert!(suite.run(quick()).unwrap().is_completed());
    }

    #[test]
    fn test_failing_candidate_is_reported_not_ranked() {
        let clock = ManualClock::new();
        let a_tick = clock.clone();
        let c_tick = clock.clone();
        let log = EventLog::new();
        let mut suite = Suite::with_clock(clock);
        suite.add("a", || a_tick.advance(Duration::from_micros(30))).unwrap();
        suite
            .add_candidate(Candidate::fallible("b", || {
                Err::<(), _>("connection reset")
            }))
            .unwrap();
        suite.add("c", || c_tick.advance(Duration::from_micros(60))).unwrap();
        suite.add_listener(log.clone());

        let report = suite.run(quick()).unwrap().unwrap_completed();

        let ranked: Vec<&str> = report.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(ranked, vec!["a", "c"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "b");
        assert_eq!(report.failures[0].phase, Phase::Invoke);
        assert_eq!(report.failures[0].message, "connection reset");

        let kinds: Vec<String> = log
            .events()
            .iter()
            .map(|e| match e {
                SuiteEvent::CandidateStart { name } => format!("start:{name}"),
                SuiteEvent::Cycle { name, .. } => format!("cycle:{name}"),
                SuiteEvent::CandidateFailed(f) => format!("failed:{}", f.name),
                SuiteEvent::Complete(_) => "complete".to_string(),
                SuiteEvent::Cancelled(_) => "cancelled".to_string(),
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                "start:a", "cycle:a", "start:b", "failed:b", "start:c", "cycle:c", "complete"
            ]
        );
    }

    struct CancelAfterFirstCycle(CancellationToken);

    impl SuiteListener for CancelAfterFirstCycle {
        fn on_cycle(&mut self, _name: &str, _stats: &Stats) {
            self.0.cancel();
        }
    }

    #[test]
    fn test_cancel_between_candidates() {
        let clock = ManualClock::new();
        let tick = clock.clone();
        let log = EventLog::new();
        let mut suite = Suite::with_clock(clock);
        suite.add("a", || tick.advance(Duration::from_micros(30))).unwrap();
        suite.add("b", || ()).unwrap();
        suite.add("c", || ()).unwrap();
        let token = suite.cancellation_token();
        suite.add_listener(CancelAfterFirstCycle(token)).add_listener(log.clone());

        let partial = suite.run(quick()).unwrap().cancelled().unwrap();

        assert_eq!(suite.state(), SuiteState::Cancelled);
        assert_eq!(partial.completed.len(), 1);
        assert_eq!(partial.completed[0].name, "a");
        assert_eq!(partial.interrupted, None);
        assert_eq!(partial.skipped, vec!["b", "c"]);

        let events = log.events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[2], SuiteEvent::Cancelled(_)));
        assert!(matches!(suite.run(quick()), Err(SuiteError::AlreadyRun)));
    }

    #[test]
    fn test_cancel_during_sampling_marks_interrupted() {
        let clock = ManualClock::new();
        let a_tick = clock.clone();
        let b_tick = clock.clone();
        let mut suite = Suite::with_clock(clock);
        let token = suite.cancellation_token();
        let mut calls = 0u32;
        suite.add("a", || a_tick.advance(Duration::from_micros(30))).unwrap();
        suite
            .add("b", move || {
                calls += 1;
                b_tick.advance(Duration::from_millis(1));
                if calls == 2 {
                    token.cancel();
                }
            })
            .unwrap();
        suite.add("c", || ()).unwrap();

        let partial = suite.run(quick()).unwrap().cancelled().unwrap();
        assert_eq!(partial.get("a").map(|c| c.name.as_str()), Some("a"));
        assert_eq!(partial.interrupted.as_deref(), Some("b"));
        assert_eq!(partial.skipped, vec!["c"]);
    }

    #[test]
    fn test_precancelled_run_skips_everything() {
        let mut suite = Suite::with_clock(ManualClock::new());
        suite.add("a", || ()).unwrap();
        suite.cancellation_token().cancel();

        let partial = suite.run(quick()).unwrap().cancelled().unwrap();
        assert!(partial.completed.is_empty());
        assert_eq!(partial.skipped, vec!["a"]);
    }
}
