//! Token bucket state transitions.
//!
//! `refill` and `consume` are pure functions over [`BucketState`]: they hold
//! no shared state and may be called concurrently on independent values.

use super::state::BucketState;

/// Decimal places kept after every arithmetic update.
const PRECISION: f64 = 1_000_000.0;

/// Round to six decimal places, half away from zero.
fn round6(value: f64) -> f64 {
    (value * PRECISION).round() / PRECISION
}

/// Add the tokens accrued between the last refill and `now`, capped at capacity.
///
/// A clock that did not advance (or went backward) leaves the state unchanged,
/// as does a non-finite `now`.
pub fn refill(state: &BucketState, now: f64) -> BucketState {
    if !now.is_finite() || now <= state.last_refill_timestamp() {
        return state.clone();
    }

    let elapsed = now - state.last_refill_timestamp();
    let added = elapsed * state.refill_rate_per_second();
    let available = round6(state.tokens() + added).min(state.capacity() as f64);

    state.advance(available, now)
}

/// Deduct `tokens` from the bucket.
///
/// Returns `None` when the bucket holds fewer than `tokens`. The refill
/// timestamp is carried over unchanged; only [`refill`] advances it.
pub fn consume(state: &BucketState, tokens: u32) -> Option<BucketState> {
    let requested = f64::from(tokens);
    if state.tokens() < requested {
        return None;
    }

    let remaining = round6(state.tokens() - requested).max(0.0);
    Some(state.advance(remaining, state.last_refill_timestamp()))
}
