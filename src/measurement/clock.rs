//! Monotonic time sources.
//!
//! Provides:
//! - [`MonotonicClock`]: `std::time::Instant` with an empirically estimated resolution
//! - [`ManualClock`]: a deterministic clock that only moves when advanced

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Number of back-to-back reads used to estimate the tick size.
const RESOLUTION_TRIALS: usize = 1000;

/// Resolution assumed when no tick could be observed.
const FALLBACK_RESOLUTION: Duration = Duration::from_micros(1);

/// A monotonic, non-decreasing time source.
///
/// Implementations must never be affected by wall-clock adjustments.
pub trait Clock {
    /// Current timestamp.
    fn now(&self) -> Instant;

    /// Time between two timestamps, saturating to zero if `end` precedes `start`.
    fn elapsed(&self, start: Instant, end: Instant) -> Duration {
        end.saturating_duration_since(start)
    }

    /// Smallest observable difference between two reads.
    fn resolution(&self) -> Duration;

    /// Short name for reports.
    fn name(&self) -> &str;
}

/// Platform monotonic clock backed by `std::time::Instant`.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    resolution: Duration,
}

impl MonotonicClock {
    /// Create a clock and measure its resolution.
    pub fn new() -> Self {
        Self {
            resolution: measure_resolution(),
        }
    }

    /// Create a clock with a known resolution, skipping the measurement.
    pub fn with_resolution(resolution: Duration) -> Self {
        Self { resolution }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn resolution(&self) -> Duration {
        self.resolution
    }

    fn name(&self) -> &str {
        "monotonic"
    }
}

/// Empirically measure the timer tick by finding the minimum non-zero difference.
fn measure_resolution() -> Duration {
    let mut min_diff = Duration::MAX;

    for _ in 0..RESOLUTION_TRIALS {
        let t1 = Instant::now();
        let mut t2 = Instant::now();
        // Spin until the clock visibly ticks, bounded so a frozen clock cannot hang us
        let mut spins = 0;
        while t2 == t1 && spins < 10_000 {
            t2 = Instant::now();
            spins += 1;
        }
        let diff = t2.saturating_duration_since(t1);
        if !diff.is_zero() && diff < min_diff {
            min_diff = diff;
        }
    }

    if min_diff == Duration::MAX {
        FALLBACK_RESOLUTION
    } else {
        min_diff
    }
}

/// Deterministic clock that advances only when told to.
///
/// Clones share the same timeline, so a workload can hold one handle and
/// advance time while the sampler reads through another.
///
/// ```
/// use std::time::Duration;
/// use rate_bench::measurement::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let start = clock.now();
/// clock.advance(Duration::from_millis(5));
/// assert_eq!(clock.elapsed(start, clock.now()), Duration::from_millis(5));
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    offset_ns: Arc<AtomicU64>,
    resolution: Duration,
}

impl ManualClock {
    /// Create a clock frozen at an arbitrary base instant with 1 ns resolution.
    pub fn new() -> Self {
        Self::with_resolution(Duration::from_nanos(1))
    }

    /// Create a clock reporting the given resolution.
    pub fn with_resolution(resolution: Duration) -> Self {
        Self {
            base: Instant::now(),
            offset_ns: Arc::new(AtomicU64::new(0)),
            resolution,
        }
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        let ns = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.offset_ns.fetch_add(ns, Ordering::SeqCst);
    }

    /// Total time advanced since creation.
    pub fn offset(&self) -> Duration {
        Duration::from_nanos(self.offset_ns.load(Ordering::SeqCst))
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.offset()
    }

    fn resolution(&self) -> Duration {
        self.resolution
    }

    fn name(&self) -> &str {
        "manual"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_non_decreasing() {
        let clock = MonotonicClock::with_resolution(Duration::from_nanos(1));
        let mut prev = clock.now();
        for _ in 0..10_000 {
            let next = clock.now();
            assert!(next >= prev);
            prev = next;
        }
    }

    #[test]
    fn test_elapsed_never_negative() {
        let clock = MonotonicClock::with_resolution(Duration::from_nanos(1));
        let a = clock.now();
        std::thread::sleep(Duration::from_millis(1));
        let b = clock.now();
        assert!(clock.elapsed(a, b) >= Duration::from_millis(1));
        assert_eq!(clock.elapsed(b, a), Duration::ZERO);
    }

    #[test]
    fn test_resolution_sub_millisecond() {
        let clock = MonotonicClock::new();
        let resolution = clock.resolution();
        assert!(!resolution.is_zero());
        assert!(
            resolution < Duration::from_millis(1),
            "resolution = {:?}",
            resolution
        );
    }

    #[test]
    fn test_manual_clock_shared_timeline() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        let start = clock.now();

        handle.advance(Duration::from_micros(250));
        assert_eq!(clock.elapsed(start, clock.now()), Duration::from_micros(250));
        assert_eq!(clock.offset(), Duration::from_micros(250));
    }

    #[test]
    fn test_manual_clock_frozen_until_advanced() {
        let clock = ManualClock::new();
        let a = clock.now();
        let b = clock.now();
        assert_eq!(a, b);
        assert_eq!(clock.name(), "manual");
    }
}
