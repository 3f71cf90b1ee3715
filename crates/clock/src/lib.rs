//! Time Abstraction
//!
//! Every debounce, cooldown, and episode timer in the pipeline compares
//! against "now". Routing those reads through a single trait keeps the
//! timing logic deterministic under test: production code uses
//! [`SystemClock`], tests use [`ManualClock`] and advance it explicitly.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Source of monotonic and wall-clock time.
pub trait Clock: Send + Sync {
    /// Monotonic instant for elapsed-time comparisons.
    fn now(&self) -> Instant;

    /// Wall-clock timestamp for persisted records.
    fn wall_now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the OS.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Controllable clock for tests.
///
/// Starts at an arbitrary origin and only moves when `advance` is
/// called, so timing-dependent detector behavior can be asserted
/// exactly.
pub struct ManualClock {
    inner: Mutex<ManualState>,
}

struct ManualState {
    origin: Instant,
    elapsed: Duration,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(ManualState {
                origin: Instant::now(),
                elapsed: Duration::ZERO,
            }),
        }
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        let mut state = self.inner.lock().unwrap();
        state.elapsed += by;
    }

    /// Move time forward by fractional seconds.
    pub fn advance_secs(&self, secs: f64) {
        self.advance(Duration::from_secs_f64(secs));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let state = self.inner.lock().unwrap();
        state.origin + state.elapsed
    }

    fn wall_now(&self) -> DateTime<Utc> {
        let state = self.inner.lock().unwrap();
        // Fixed epoch keeps persisted timestamps reproducible in tests.
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
            + chrono::Duration::from_std(state.elapsed).unwrap_or_else(|_| chrono::Duration::zero())
    }
}
