//! Bucket identity handling.

/// The composite `(key, resource)` pair identifying one bucket.
///
/// The same key may be limited independently per resource, e.g. a user id
/// against both `"login"` and `"search"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketId {
    /// The caller-chosen key, e.g. a user id or client address
    pub key: String,
    /// The resource being limited
    pub resource: String,
}

impl BucketId {
    /// Create a new bucket identity.
    pub fn new(key: &str, resource: &str) -> Self {
        Self {
            key: key.to_string(),
            resource: resource.to_string(),
        }
    }

    /// Flatten the identity to `resource:key`.
    ///
    /// This is the layout map-based and key-value storage adapters use.
    pub fn to_string_key(&self) -> String {
        format!("{}:{}", self.resource, self.key)
    }
}

impl std::fmt::Display for BucketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string_key())
    }
}
