//! Error types for the token bucket limiter.

use thiserror::Error;

/// Main error type for limiter operations.
///
/// A denied request is not an error: it is reported as `false` from
/// [`RateLimiter::allow`](crate::ratelimit::RateLimiter::allow).
#[derive(Error, Debug)]
pub enum TokenbucketError {
    /// Bucket parameters or token counts outside their valid range
    #[error("Invalid bucket state: {0}")]
    InvalidState(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for limiter operations.
pub type Result<T> = std::result::Result<T, TokenbucketError>;
