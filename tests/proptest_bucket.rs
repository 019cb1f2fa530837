//! Property-based tests for bucket transitions and limiter decisions

use std::sync::Arc;

use proptest::prelude::*;
use tokenbucket::ratelimit::token_bucket::{consume, refill};
use tokenbucket::ratelimit::{BucketState, InMemoryStorage, ManualClock, RateLimiter};

/// An arbitrary valid bucket.
fn bucket_state() -> impl Strategy<Value = BucketState> {
    (1u64..1000, 0.001f64..1000.0, 0.0f64..=1.0, -1e6f64..1e6).prop_map(
        |(capacity, rate, fill, ts)| {
            BucketState::new(capacity, rate, fill * capacity as f64, ts).unwrap()
        },
    )
}

#[derive(Debug, Clone)]
enum Step {
    Refill(f64),
    Consume(u32),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (-10.0f64..100.0).prop_map(Step::Refill),
        (0u32..50).prop_map(Step::Consume),
    ]
}

proptest! {
    #[test]
    fn test_tokens_stay_within_capacity(
        initial in bucket_state(),
        steps in prop::collection::vec(step(), 1..50),
    ) {
        let mut state = initial;
        let mut now = state.last_refill_timestamp();

        for step in steps {
            match step {
                Step::Refill(delta) => {
                    now += delta;
                    state = refill(&state, now);
                }
                Step::Consume(tokens) => {
                    if let Some(next) = consume(&state, tokens) {
                        state = next;
                    }
                }
            }
            prop_assert!(state.tokens() >= 0.0);
            prop_assert!(state.tokens() <= state.capacity() as f64);
        }
    }

    #[test]
    fn test_refill_is_monotonic(
        state in bucket_state(),
        first in 0.001f64..100.0,
        second in 0.001f64..100.0,
    ) {
        let now1 = state.last_refill_timestamp() + first;
        let now2 = now1 + second;

        let once = refill(&state, now1);
        let twice = refill(&once, now2);

        prop_assert!(twice.tokens() >= once.tokens());
    }

    #[test]
    fn test_refill_noop_on_stale_clock(state in bucket_state(), back in 0.0f64..1000.0) {
        let now = state.last_refill_timestamp() - back;
        prop_assert_eq!(refill(&state, now), state);
    }

    #[test]
    fn test_consume_conserves_tokens(state in bucket_state(), tokens in 0u32..1000) {
        match consume(&state, tokens) {
            Some(next) => {
                let expected = state.tokens() - f64::from(tokens);
                prop_assert!((next.tokens() - expected).abs() <= 1e-6);
                prop_assert_eq!(next.last_refill_timestamp(), state.last_refill_timestamp());
                prop_assert_eq!(next.capacity(), state.capacity());
            }
            None => prop_assert!(state.tokens() < f64::from(tokens)),
        }
    }

    #[test]
    fn test_denied_request_persists_refill(
        capacity in 1u64..500,
        tokens_per_second in 1u64..100,
        elapsed in 0.0f64..60.0,
    ) {
        let clock = Arc::new(ManualClock::new(0.0));
        let limiter = RateLimiter::per_second(InMemoryStorage::new(), capacity, tokens_per_second)
            .unwrap()
            .with_clock(clock.clone());

        prop_assert!(limiter.allow("user", "global", capacity as u32));

        clock.set(elapsed);
        let oversized = capacity as u32 + 1;
        prop_assert!(!limiter.allow("user", "global", oversized));

        let state = limiter.get_state("user", "global").unwrap();
        let accrued = (elapsed * tokens_per_second as f64).min(capacity as f64);
        prop_assert!((state.tokens() - accrued).abs() <= 1e-6);
        if elapsed > 0.0 {
            prop_assert_eq!(state.last_refill_timestamp(), elapsed);
        }
    }
}
