//! In-memory bucket storage.

use dashmap::DashMap;

use super::identity::BucketId;
use super::state::BucketState;
use super::storage::BucketStorage;

/// Bucket storage backed by a concurrent map owned by this instance.
///
/// Individual loads and saves are thread-safe, but the limiter's
/// load-modify-save sequence is not atomic here: two concurrent decisions on
/// the same bucket can lose an update. Use it for single-process callers
/// that either serialize access per bucket or tolerate that.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    buckets: DashMap<String, BucketState>,
}

impl InMemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the stored state for one bucket, returning it if present.
    pub fn remove(&self, key: &str, resource: &str) -> Option<BucketState> {
        self.buckets
            .remove(&BucketId::new(key, resource).to_string_key())
            .map(|(_, state)| state)
    }

    /// Clear all buckets.
    pub fn clear(&self) {
        self.buckets.clear();
    }

    /// Get the number of stored buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether no bucket has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl BucketStorage for InMemoryStorage {
    fn load(&self, key: &str, resource: &str) -> Option<BucketState> {
        self.buckets
            .get(&BucketId::new(key, resource).to_string_key())
            .map(|entry| entry.value().clone())
    }

    fn save(&self, key: &str, resource: &str, state: BucketState) {
        self.buckets
            .insert(BucketId::new(key, resource).to_string_key(), state);
    }
}
