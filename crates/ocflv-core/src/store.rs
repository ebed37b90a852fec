//! Object-store contract consumed by the verification engine.
//!
//! Implementations live in `ocflv-store`; the engine only sees this trait.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Metadata of a stored object, as returned by a HEAD-style request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    /// Content fingerprint as reported by the store (an ETag, possibly quoted).
    pub content_digest: String,
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
}

impl ObjectMetadata {
    /// Metadata carrying only a digest.
    pub fn with_digest(content_digest: impl Into<String>) -> Self {
        Self {
            content_digest: content_digest.into(),
            content_length: None,
            content_type: None,
        }
    }
}

/// Read access to the object store holding preserved objects.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Retrieve the full content stored under `key`.
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Retrieve the metadata of the object under `key` without its content.
    async fn head_metadata(&self, key: &str) -> Result<ObjectMetadata, StoreError>;
}
