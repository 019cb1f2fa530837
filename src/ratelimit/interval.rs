//! Refill interval granularity.

use serde::{Deserialize, Serialize};

/// Interval over which `tokens_per_interval` tokens are replenished.
///
/// The bucket itself only ever deals in tokens per second; an interval is a
/// convenience for expressing limits like "600 per minute".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    /// Per-second replenishment
    #[default]
    Second,
    /// Per-minute replenishment
    Minute,
    /// Per-hour replenishment
    Hour,
    /// Per-day replenishment
    Day,
}

impl Interval {
    /// Length of this interval in whole seconds.
    pub fn as_secs(&self) -> u64 {
        match self {
            Interval::Second => 1,
            Interval::Minute => 60,
            Interval::Hour => 3600,
            Interval::Day => 86400,
        }
    }
}
