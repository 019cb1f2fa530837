//! Token bucket rate limiting and bucket state management.

mod clock;
mod identity;
mod interval;
mod limiter;
mod memory;
mod state;
mod storage;
pub mod token_bucket;

pub use clock::{Clock, ManualClock, SystemClock};
pub use identity::BucketId;
pub use interval::Interval;
pub use limiter::{Decision, RateLimiter, DEFAULT_RESOURCE};
pub use memory::InMemoryStorage;
pub use state::BucketState;
pub use storage::BucketStorage;
