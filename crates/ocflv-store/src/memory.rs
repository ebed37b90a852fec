//! In-memory object store.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use ocflv_core::{ObjectMetadata, ObjectStore, StoreError};

#[derive(Debug, Clone)]
struct StoredObject {
    body: Vec<u8>,
    etag: String,
    content_type: Option<String>,
}

/// `DashMap`-backed store keyed by physical key.
///
/// ETags are whatever the caller records; [`MemoryObjectStore::put`] records
/// a quoted placeholder derived from the body. `head_metadata` calls are
/// counted so cache behaviour can be observed.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: DashMap<String, StoredObject>,
    head_calls: AtomicUsize,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `body` under `key` with a placeholder ETag, returning it.
    pub fn put(&self, key: impl Into<String>, body: impl Into<Vec<u8>>) -> String {
        let body = body.into();
        let mut hasher = DefaultHasher::new();
        body.hash(&mut hasher);
        let etag = format!("\"{:016x}\"", hasher.finish());
        self.insert(key.into(), body, etag.clone());
        etag
    }

    /// Store `body` under `key` with an explicit ETag (quoted or not).
    pub fn put_with_etag(&self, key: impl Into<String>, body: impl Into<Vec<u8>>, etag: impl Into<String>) {
        self.insert(key.into(), body.into(), etag.into());
    }

    fn insert(&self, key: String, body: Vec<u8>, etag: String) {
        let content_type = key.ends_with(".json").then(|| "application/json".to_string());
        self.objects.insert(
            key,
            StoredObject {
                body,
                etag,
                content_type,
            },
        );
    }

    /// Remove the object under `key`; returns whether it existed.
    pub fn remove(&self, key: &str) -> bool {
        self.objects.remove(key).is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of `head_metadata` calls served so far, hits and misses alike.
    pub fn head_calls(&self) -> usize {
        self.head_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.objects
            .get(key)
            .map(|object| object.body.clone())
            .ok_or_else(|| StoreError::NotFound { key: key.to_string() })
    }

    async fn head_metadata(&self, key: &str) -> Result<ObjectMetadata, StoreError> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);
        self.objects
            .get(key)
            .map(|object| ObjectMetadata {
                content_digest: object.etag.clone(),
                content_length: Some(object.body.len() as u64),
                content_type: object.content_type.clone(),
            })
            .ok_or_else(|| StoreError::NotFound { key: key.to_string() })
    }
}
