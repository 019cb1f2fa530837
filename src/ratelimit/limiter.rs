//! Core rate limiter implementation.

use std::time::Duration;
use tracing::{debug, trace, warn};

use crate::config::LimiterConfig;
use crate::error::Result;

use super::clock::{Clock, SystemClock};
use super::identity::BucketId;
use super::interval::Interval;
use super::state::{validate_params, BucketState};
use super::storage::BucketStorage;
use super::token_bucket::{consume, refill};

/// Resource used by [`RateLimiter::allow_default`] unless configured otherwise.
pub const DEFAULT_RESOURCE: &str = "global";

/// Outcome of a single rate limit check.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// Whether the request may proceed
    pub allowed: bool,
    /// Tokens left in the bucket after this decision
    pub remaining: f64,
    /// Bucket capacity
    pub limit: u64,
    /// Time until the denied request could succeed; `None` when allowed or
    /// when the request exceeds capacity and can never succeed
    pub retry_after: Option<Duration>,
}

/// Token bucket rate limiter over a pluggable [`BucketStorage`].
///
/// Every decision loads the bucket, refills it, tries to consume, and saves
/// the result: one load and one save per call. The limiter holds no bucket
/// state of its own between calls.
pub struct RateLimiter<S: BucketStorage, C: Clock = SystemClock> {
    /// Where bucket states live
    storage: S,
    /// Time source for refills
    clock: C,
    /// Maximum tokens per bucket
    capacity: u64,
    /// Tokens added per second
    refill_rate_per_second: f64,
    /// Resource for callers that do not name one
    default_resource: String,
}

impl<S: BucketStorage> RateLimiter<S> {
    /// Create a limiter replenishing `tokens_per_interval` tokens every
    /// `interval_seconds` seconds, up to `capacity`.
    pub fn new(
        storage: S,
        capacity: u64,
        tokens_per_interval: u64,
        interval_seconds: u64,
    ) -> Result<Self> {
        let refill_rate_per_second = if interval_seconds == 0 {
            0.0
        } else {
            tokens_per_interval as f64 / interval_seconds as f64
        };
        validate_params(capacity, refill_rate_per_second)?;

        debug!(
            capacity = capacity,
            refill_rate_per_second = refill_rate_per_second,
            "Creating rate limiter"
        );

        Ok(Self {
            storage,
            clock: SystemClock,
            capacity,
            refill_rate_per_second,
            default_resource: DEFAULT_RESOURCE.to_string(),
        })
    }

    /// Create a limiter using a named interval.
    pub fn with_interval(
        storage: S,
        capacity: u64,
        tokens_per_interval: u64,
        interval: Interval,
    ) -> Result<Self> {
        Self::new(storage, capacity, tokens_per_interval, interval.as_secs())
    }

    /// Create a limiter replenishing `tokens_per_second` each second.
    pub fn per_second(storage: S, capacity: u64, tokens_per_second: u64) -> Result<Self> {
        Self::with_interval(storage, capacity, tokens_per_second, Interval::Second)
    }

    /// Create a limiter replenishing `tokens_per_minute` each minute.
    pub fn per_minute(storage: S, capacity: u64, tokens_per_minute: u64) -> Result<Self> {
        Self::with_interval(storage, capacity, tokens_per_minute, Interval::Minute)
    }

    /// Create a limiter replenishing `tokens_per_hour` each hour.
    pub fn per_hour(storage: S, capacity: u64, tokens_per_hour: u64) -> Result<Self> {
        Self::with_interval(storage, capacity, tokens_per_hour, Interval::Hour)
    }

    /// Create a limiter from loaded configuration.
    pub fn from_config(storage: S, config: &LimiterConfig) -> Result<Self> {
        config.validate()?;
        let mut limiter = Self::new(
            storage,
            config.capacity,
            config.tokens_per_interval,
            config.interval_secs(),
        )?;
        limiter.default_resource = config.default_resource.clone();
        Ok(limiter)
    }
}

impl<S: BucketStorage, C: Clock> RateLimiter<S, C> {
    /// Replace the time source.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> RateLimiter<S, C2> {
        RateLimiter {
            storage: self.storage,
            clock,
            capacity: self.capacity,
            refill_rate_per_second: self.refill_rate_per_second,
            default_resource: self.default_resource,
        }
    }

    /// Decide whether `tokens` may be taken from the `(key, resource)` bucket.
    pub fn allow(&self, key: &str, resource: &str, tokens: u32) -> bool {
        self.check(key, resource, tokens).allowed
    }

    /// Decide whether one token may be taken from `key`'s bucket for the
    /// default resource.
    pub fn allow_default(&self, key: &str) -> bool {
        self.allow(key, &self.default_resource, 1)
    }

    /// Check the rate limit and report the details of the decision.
    ///
    /// A denied request still persists the refilled state so elapsed time is
    /// never lost between calls.
    ///
    /// A non-finite clock reading leaves stored buckets unrefilled. A bucket
    /// that does not exist yet is not created from such a reading; the request
    /// is denied and nothing is saved.
    pub fn check(&self, key: &str, resource: &str, tokens: u32) -> Decision {
        let now = self.clock.now();
        if !now.is_finite() {
            warn!(now = now, "Clock returned a non-finite timestamp");
        }

        let state = match self.storage.load(key, resource) {
            Some(state) => state,
            None if !now.is_finite() => {
                return Decision {
                    allowed: false,
                    remaining: 0.0,
                    limit: self.capacity,
                    retry_after: None,
                };
            }
            None => {
                debug!(
                    bucket = %BucketId::new(key, resource),
                    capacity = self.capacity,
                    "Creating new bucket"
                );
                self.full_bucket(now)
            }
        };

        let refilled = refill(&state, now);

        let decision = match consume(&refilled, tokens) {
            Some(consumed) => {
                let decision = Decision {
                    allowed: true,
                    remaining: consumed.tokens(),
                    limit: refilled.capacity(),
                    retry_after: None,
                };
                self.storage.save(key, resource, consumed);
                decision
            }
            None => {
                debug!(
                    bucket = %BucketId::new(key, resource),
                    requested = tokens,
                    available = refilled.tokens(),
                    "Rate limit exceeded"
                );
                let decision = Decision {
                    allowed: false,
                    remaining: refilled.tokens(),
                    limit: refilled.capacity(),
                    retry_after: retry_after(&refilled, tokens),
                };
                self.storage.save(key, resource, refilled);
                decision
            }
        };

        trace!(
            key = %key,
            resource = %resource,
            tokens = tokens,
            allowed = decision.allowed,
            remaining = decision.remaining,
            "Checked rate limit"
        );

        decision
    }

    /// Get the stored state of a bucket, or `None` if it was never used.
    pub fn get_state(&self, key: &str, resource: &str) -> Option<BucketState> {
        self.storage.load(key, resource)
    }

    /// Maximum tokens per bucket.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Tokens added per second.
    pub fn refill_rate_per_second(&self) -> f64 {
        self.refill_rate_per_second
    }

    /// Resource used by [`allow_default`](Self::allow_default).
    pub fn default_resource(&self) -> &str {
        &self.default_resource
    }

    /// The underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn full_bucket(&self, now: f64) -> BucketState {
        BucketState::full(self.capacity, self.refill_rate_per_second, now)
    }
}

/// Time until `state` holds `tokens`, if it ever can.
fn retry_after(state: &BucketState, tokens: u32) -> Option<Duration> {
    let requested = f64::from(tokens);
    if requested > state.capacity() as f64 {
        return None;
    }
    let deficit = (requested - state.tokens()).max(0.0);
    Duration::try_from_secs_f64(deficit / state.refill_rate_per_second()).ok()
}
