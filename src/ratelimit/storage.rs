//! Storage contract for bucket state.

use std::sync::Arc;

use super::state::BucketState;

/// Persistence for bucket states, keyed by `(key, resource)`.
///
/// The limiter performs exactly one `load` and one `save` per decision and
/// does not lock between them. An implementation shared by concurrent callers
/// must serialize the load-modify-save sequence itself (compare-and-swap,
/// per-key locking, or an atomic scripted update) if lost updates matter.
pub trait BucketStorage: Send + Sync {
    /// Load the stored state, or `None` if this identity has never been saved.
    fn load(&self, key: &str, resource: &str) -> Option<BucketState>;

    /// Store `state`, overwriting any prior record for the same identity.
    fn save(&self, key: &str, resource: &str, state: BucketState);
}

impl<S: BucketStorage + ?Sized> BucketStorage for Arc<S> {
    fn load(&self, key: &str, resource: &str) -> Option<BucketState> {
        (**self).load(key, resource)
    }

    fn save(&self, key: &str, resource: &str, state: BucketState) {
        (**self).save(key, resource, state)
    }
}

impl<S: BucketStorage + ?Sized> BucketStorage for &S {
    fn load(&self, key: &str, resource: &str) -> Option<BucketState> {
        (**self).load(key, resource)
    }

    fn save(&self, key: &str, resource: &str, state: BucketState) {
        (**self).save(key, resource, state)
    }
}
