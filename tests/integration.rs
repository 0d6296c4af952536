//! End-to-end integration tests.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use rate_bench::output::{format_report, to_json};
use rate_bench::{
    compare, Candidate, ManualClock, Outcome, Phase, RunConfig, Stats, Suite, SuiteError,
    SuiteEvent, SuiteListener,
};

/// A no-op candidate decisively beats one that sleeps for 5 ms.
#[test]
fn fast_beats_sleeping_slow() {
    assert_fast_beats_slow(RunConfig::quick());
}

/// Same comparison under the default configuration.
#[test]
fn fast_beats_sleeping_slow_with_default_config() {
    assert_fast_beats_slow(RunConfig::default());
}

fn assert_fast_beats_slow(config: RunConfig) {
    let mut suite = Suite::new();
    suite
        .add("fast", || std::hint::black_box(1 + 1))
        .unwrap()
        .add("slow", || thread::sleep(Duration::from_millis(5)))
        .unwrap();

    let report = suite.run(config).unwrap().unwrap_completed();

    assert_eq!(report.fastest, vec!["fast"]);
    assert_eq!(report.slowest, vec!["slow"]);
    let fast = report.get("fast").unwrap();
    let slow = report.get("slow").unwrap();
    assert_eq!(fast.rank, 1);
    assert_eq!(slow.rank, 2);
    assert_eq!(fast.differs_from("slow"), Some(true));
    assert_eq!(slow.differs_from("fast"), Some(true));
    // A 5 ms sleep cannot exceed 200 calls per second
    assert!(slow.stats.mean_rate < 200.0 + slow.stats.margin_of_error);
    assert!(report.metadata.runtime_secs > 0.0);
    assert_eq!(report.metadata.clock, "monotonic");
}

/// A constant-cost work function on a manual clock converges to 1/T.
#[test]
fn constant_cost_converges_to_inverse_period() {
    let clock = ManualClock::new();
    let tick = clock.clone();
    let mut suite = Suite::with_clock(clock);
    suite
        .add("const", || tick.advance(Duration::from_micros(40)))
        .unwrap();

    let report = suite.run(RunConfig::default()).unwrap().unwrap_completed();
    let stats = &report.results[0].stats;

    assert!((stats.mean_rate - 25_000.0).abs() < 1e-6);
    assert!((stats.mean_period_secs - 40e-6).abs() < 1e-15);
    assert!(stats.margin_of_error_pct <= 1.0);
    assert!(stats.sample_count >= 5);
}

/// A candidate that always fails is reported while the others are ranked.
#[test]
fn failing_candidate_does_not_stop_the_run() {
    let (tx, rx) = mpsc::channel::<SuiteEvent>();
    let mut suite = Suite::new();
    suite.add("sum", || (0..32u64).sum::<u64>()).unwrap();
    suite
        .add_candidate(Candidate::fallible("decode", || {
            "not a number".parse::<u32>()
        }))
        .unwrap();
    suite.add("product", || (1..16u64).product::<u64>()).unwrap();
    suite.add_listener(tx);

    let report = suite.run(RunConfig::quick()).unwrap().unwrap_completed();

    assert_eq!(report.results.len(), 2);
    assert!(report.get("decode").is_none());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].name, "decode");
    assert_eq!(report.failures[0].phase, Phase::Invoke);
    assert!(!report.failures[0].panicked);

    let events: Vec<SuiteEvent> = rx.try_iter().collect();
    let failed: Vec<&SuiteEvent> = events
        .iter()
        .filter(|e| matches!(e, SuiteEvent::CandidateFailed(_)))
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].candidate(), Some("decode"));
}

/// Events arrive in registration order and end with exactly one completion.
#[test]
fn event_order_is_exact() {
    let (tx, rx) = mpsc::channel::<SuiteEvent>();
    let clock = ManualClock::new();
    let a = clock.clone();
    let c = clock.clone();
    let mut suite = Suite::with_clock(clock);
    suite.add("a", || a.advance(Duration::from_micros(10))).unwrap();
    suite
        .add_candidate(
            Candidate::new("b", || ()).with_fallible_setup(|| Err::<(), _>("no fixture")),
        )
        .unwrap();
    suite.add("c", || c.advance(Duration::from_micros(30))).unwrap();
    suite.add_listener(tx);

    suite.run(RunConfig::quick()).unwrap();

    let events: Vec<SuiteEvent> = rx.try_iter().collect();
    let names: Vec<Option<&str>> = events.iter().map(SuiteEvent::candidate).collect();
    assert_eq!(
        names,
        vec![Some("a"), Some("a"), Some("b"), Some("b"), Some("c"), Some("c"), None]
    );
    assert!(matches!(events[0], SuiteEvent::CandidateStart { .. }));
    assert!(matches!(events[1], SuiteEvent::Cycle { .. }));
    assert!(matches!(events[3], SuiteEvent::CandidateFailed(ref f) if f.phase == Phase::Setup));
    assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
    assert!(matches!(events.last(), Some(SuiteEvent::Complete(_))));
}

struct StopAfterFirst(rate_bench::CancellationToken);

impl SuiteListener for StopAfterFirst {
    fn on_cycle(&mut self, _name: &str, _stats: &Stats) {
        self.0.cancel();
    }
}

/// Cancelling after the first cycle yields exactly one candidate's stats.
#[test]
fn cancellation_after_first_cycle() {
    let mut suite = Suite::new();
    suite.add("first", || std::hint::black_box(3 * 7)).unwrap();
    suite.add("second", || std::hint::black_box(3 + 7)).unwrap();
    let token = suite.cancellation_token();
    suite.add_listener(StopAfterFirst(token));

    match suite.run(RunConfig::quick()).unwrap() {
        Outcome::Cancelled(partial) => {
            assert_eq!(partial.completed.len(), 1);
            assert_eq!(partial.completed[0].name, "first");
            assert_eq!(partial.skipped, vec!["second"]);
            assert!(partial.interrupted.is_none());
        }
        Outcome::Completed(_) => panic!("expected cancellation"),
    }
}

/// Cancellation from another thread interrupts sampling between batches.
#[test]
fn cancellation_from_another_thread() {
    let mut suite = Suite::new();
    suite
        .add("sleepy", || thread::sleep(Duration::from_millis(1)))
        .unwrap();
    let token = suite.cancellation_token();

    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        token.cancel();
    });
    // Default config would sample for at least a second
    let outcome = suite.run(RunConfig::default()).unwrap();
    canceller.join().unwrap();

    let partial = outcome.cancelled().expect("run should be cancelled");
    assert_eq!(partial.interrupted.as_deref(), Some("sleepy"));
    assert!(partial.completed.is_empty());
}

/// A suite runs once; duplicates are rejected without side effects.
#[test]
fn registration_and_rerun_errors() {
    let mut suite = Suite::new();
    suite.add("x", || 1u8).unwrap();
    assert!(matches!(
        suite.add("x", || 2u8),
        Err(SuiteError::DuplicateName { .. })
    ));
    assert_eq!(suite.candidate_names(), vec!["x"]);

    suite.run(RunConfig::quick()).unwrap();
    let err = suite.run(RunConfig::quick()).unwrap_err();
    assert!(matches!(err, SuiteError::AlreadyRun));
    assert!(err.to_string().contains("already been run"));
}

/// The convenience function rejects an empty list.
#[test]
fn convenience_function_requires_candidates() {
    let none: Vec<Candidate<'_>> = Vec::new();
    assert!(matches!(compare(none), Err(SuiteError::NoCandidates)));
}

/// JSON and terminal output both carry the ranking.
#[test]
fn report_output() {
    let clock = ManualClock::new();
    let quick_tick = clock.clone();
    let slow_tick = clock.clone();
    let mut suite = Suite::with_clock(clock);
    suite
        .add("quick", || quick_tick.advance(Duration::from_micros(2)))
        .unwrap()
        .add("slow", || slow_tick.advance(Duration::from_micros(8)))
        .unwrap();

    let report = suite.run(RunConfig::quick()).unwrap().unwrap_completed();

    let json = to_json(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["fastest"][0], "quick");
    assert_eq!(value["results"][0]["name"], "quick");
    assert_eq!(value["results"][1]["rank"], 2);
    assert_eq!(
        value["results"][0]["significantly_different_from"]["slow"],
        true
    );

    let text = format_report(&report);
    assert!(text.contains("quick x 500,000 ops/sec"));
    assert!(text.contains("slow x 125,000 ops/sec"));
    assert!(text.contains("Fastest is quick"));
}
