//! Immutable snapshot of a single token bucket.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TokenbucketError};

/// The persisted state of one bucket.
///
/// A `BucketState` is a plain value: every transition produces a new state and
/// leaves the original untouched, so a stale copy held by another reader stays
/// valid. Construction always validates, including deserialization of a stored
/// record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredBucketState")]
pub struct BucketState {
    /// Maximum tokens the bucket can hold
    capacity: u64,
    /// Tokens added per elapsed second
    refill_rate_per_second: f64,
    /// Tokens currently available, within `[0, capacity]`
    tokens: f64,
    /// Seconds timestamp of the last refill
    last_refill_timestamp: f64,
}

impl BucketState {
    /// Create a validated bucket state.
    ///
    /// Fails with [`TokenbucketError::InvalidState`] when `capacity` is zero, the refill
    /// rate is not positive, or `tokens` falls outside `[0, capacity]`.
    pub fn new(
        capacity: u64,
        refill_rate_per_second: f64,
        tokens: f64,
        last_refill_timestamp: f64,
    ) -> Result<Self> {
        validate_params(capacity, refill_rate_per_second)?;

        if !tokens.is_finite() || tokens < 0.0 || tokens > capacity as f64 {
            return Err(TokenbucketError::InvalidState(format!(
                "tokens must be within [0, {}], got {}",
                capacity, tokens
            )));
        }
        if !last_refill_timestamp.is_finite() {
            return Err(TokenbucketError::InvalidState(format!(
                "last refill timestamp must be finite, got {}",
                last_refill_timestamp
            )));
        }

        Ok(Self {
            capacity,
            refill_rate_per_second,
            tokens,
            last_refill_timestamp,
        })
    }

    /// Create a bucket filled to capacity, last refilled at `now`.
    pub fn new_full(capacity: u64, refill_rate_per_second: f64, now: f64) -> Result<Self> {
        Self::new(capacity, refill_rate_per_second, capacity as f64, now)
    }

    /// Copy this state with new `tokens` and `timestamp`, validating the result.
    pub fn with_tokens_and_timestamp(&self, tokens: f64, timestamp: f64) -> Result<Self> {
        Self::new(self.capacity, self.refill_rate_per_second, tokens, timestamp)
    }

    /// Full bucket from parameters already checked by [`validate_params`].
    pub(super) fn full(capacity: u64, refill_rate_per_second: f64, now: f64) -> Self {
        debug_assert!(validate_params(capacity, refill_rate_per_second).is_ok());
        debug_assert!(now.is_finite());
        Self {
            capacity,
            refill_rate_per_second,
            tokens: capacity as f64,
            last_refill_timestamp: now,
        }
    }

    /// Copy used by the bucket transitions, whose arithmetic already keeps
    /// `tokens` within `[0, capacity]`.
    pub(super) fn advance(&self, tokens: f64, timestamp: f64) -> Self {
        debug_assert!(tokens >= 0.0 && tokens <= self.capacity as f64);
        Self {
            tokens,
            last_refill_timestamp: timestamp,
            ..self.clone()
        }
    }

    /// Maximum tokens the bucket can hold.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Tokens added per elapsed second.
    pub fn refill_rate_per_second(&self) -> f64 {
        self.refill_rate_per_second
    }

    /// Tokens currently available.
    pub fn tokens(&self) -> f64 {
        self.tokens
    }

    /// Timestamp, in seconds, of the last refill.
    pub fn last_refill_timestamp(&self) -> f64 {
        self.last_refill_timestamp
    }
}

/// Check the parameters shared by every bucket of a limiter.
pub(crate) fn validate_params(capacity: u64, refill_rate_per_second: f64) -> Result<()> {
    if capacity == 0 {
        return Err(TokenbucketError::InvalidState("capacity must be positive".to_string()));
    }
    if !refill_rate_per_second.is_finite() || refill_rate_per_second <= 0.0 {
        return Err(TokenbucketError::InvalidState(format!(
            "refill rate must be positive, got {}",
            refill_rate_per_second
        )));
    }
    Ok(())
}

/// Wire shape of a stored bucket, validated on the way in.
#[derive(Deserialize)]
struct StoredBucketState {
    capacity: u64,
    refill_rate_per_second: f64,
    tokens: f64,
    last_refill_timestamp: f64,
}

impl TryFrom<StoredBucketState> for BucketState {
    type Error = TokenbucketError;

    fn try_from(stored: StoredBucketState) -> Result<Self> {
        BucketState::new(
            stored.capacity,
            stored.refill_rate_per_second,
            stored.tokens,
            stored.last_refill_timestamp,
        )
    }
}
