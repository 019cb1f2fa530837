//! Time sources for the rate limiter.

use chrono::Utc;
use parking_lot::Mutex;

/// A source of timestamps, in seconds, for bucket refills.
pub trait Clock: Send + Sync {
    /// Current time in seconds.
    ///
    /// A non-finite reading is never stored: the limiter skips the refill and
    /// denies requests for buckets it would have to create.
    fn now(&self) -> f64;
}

/// Wall-clock Unix time with microsecond precision.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        Utc::now().timestamp_micros() as f64 / 1_000_000.0
    }
}

/// A clock that only moves when told to.
///
/// Useful for deterministic tests and simulations of bucket behavior.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<f64>,
}

impl ManualClock {
    /// Create a clock reading `start` seconds.
    pub fn new(start: f64) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Jump to an absolute time, which may be earlier than the current one.
    pub fn set(&self, now: f64) {
        *self.now.lock() = now;
    }

    /// Move the clock forward by `seconds`.
    pub fn advance(&self, seconds: f64) {
        *self.now.lock() += seconds;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        *self.now.lock()
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> f64 {
        (**self).now()
    }
}
