//! Tokenbucket - Token Bucket Rate Limiting
//!
//! This crate decides whether a request for a `(key, resource)` pair may
//! proceed, based on a replenishing pool of tokens kept in a pluggable
//! [`BucketStorage`](ratelimit::BucketStorage). Bucket transitions are pure
//! functions over immutable [`BucketState`](ratelimit::BucketState) values;
//! the [`RateLimiter`](ratelimit::RateLimiter) loads, refills, consumes and
//! saves around each decision.
//!
//! ```
//! use tokenbucket::ratelimit::{InMemoryStorage, RateLimiter};
//!
//! let limiter = RateLimiter::per_minute(InMemoryStorage::new(), 10, 60)?;
//! assert!(limiter.allow("client_a", "search", 1));
//! # Ok::<(), tokenbucket::error::TokenbucketError>(())
//! ```

pub mod config;
pub mod error;
pub mod ratelimit;

pub use config::LimiterConfig;
pub use error::{Result, TokenbucketError};
pub use ratelimit::{BucketState, BucketStorage, InMemoryStorage, RateLimiter};
