//! # ocflv-store: Object-Store Collaborators
//!
//! Implementations of [`ocflv_core::ObjectStore`]:
//!
//! - [`HttpObjectStore`]: S3-compatible, path-style HTTP endpoint
//!   (`{endpoint}/{bucket}/{key}`). `GET` for content, `HEAD` for the ETag.
//! - [`MemoryObjectStore`]: in-process store for development and tests.
//! - [`CachingObjectStore`]: wraps any store and memoizes `head_metadata`
//!   per physical key with single-flight population.
//!
//! Reads that fail in transport or hit a throttling status (`503 SlowDown`
//! and friends) are replayed under a [`RetryPolicy`].
//!
//! Configuration comes from the environment through [`StoreConfig`].
//!
//! ## Crate Policy
//!
//! - Depends on `ocflv-core` only for the store contract and its error type.
//! - Read-only: nothing here issues a write to the remote store.
//! - No `.unwrap()` outside tests.

pub mod cache;
pub mod config;
pub mod http;
pub mod memory;
pub mod retry;

use std::sync::Arc;

pub use cache::CachingObjectStore;
pub use config::{ConfigError, StoreConfig};
pub use http::HttpObjectStore;
pub use memory::MemoryObjectStore;
pub use retry::RetryPolicy;

use ocflv_core::{ObjectStore, StoreError};

/// Build the HTTP store described by `config`, optionally behind the
/// metadata cache.
pub fn connect(config: &StoreConfig, cache_metadata: bool) -> Result<Arc<dyn ObjectStore>, StoreError> {
    let store = Arc::new(HttpObjectStore::new(config)?);
    if cache_metadata {
        Ok(Arc::new(CachingObjectStore::new(store)))
    } else {
        Ok(store)
    }
}
