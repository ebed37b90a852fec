//! Process-wide metadata cache.
//!
//! Physical keys are content-addressed and never rewritten, so a key's
//! metadata is memoized for the life of the process with no invalidation.
//! Population is single-flight: concurrent lookups of one key share a single
//! in-flight request through a per-key [`OnceCell`]. A failed lookup leaves
//! the cell empty and the next caller retries. `fetch` is not cached.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use ocflv_core::{ObjectMetadata, ObjectStore, StoreError};
use tokio::sync::OnceCell;

/// Wraps a store and memoizes `head_metadata` per key.
pub struct CachingObjectStore<S: ObjectStore + ?Sized> {
    inner: Arc<S>,
    entries: DashMap<String, Arc<OnceCell<ObjectMetadata>>>,
}

impl<S: ObjectStore + ?Sized> CachingObjectStore<S> {
    pub fn new(inner: Arc<S>) -> Self {
        Self {
            inner,
            entries: DashMap::new(),
        }
    }

    pub fn inner(&self) -> &Arc<S> {
        &self.inner
    }

    /// Number of keys with a populated entry.
    pub fn cached(&self) -> usize {
        self.entries.iter().filter(|entry| entry.value().initialized()).count()
    }
}

impl<S: ObjectStore + ?Sized> std::fmt::Debug for CachingObjectStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingObjectStore")
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<S: ObjectStore + ?Sized> ObjectStore for CachingObjectStore<S> {
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.inner.fetch(key).await
    }

    async fn head_metadata(&self, key: &str) -> Result<ObjectMetadata, StoreError> {
        let cell = self.entries.entry(key.to_string()).or_default().value().clone();
        if let Some(metadata) = cell.get() {
            tracing::trace!(key, "metadata cache hit");
            return Ok(metadata.clone());
        }
        cell.get_or_try_init(|| self.inner.head_metadata(key))
            .await
            .cloned()
    }
}
