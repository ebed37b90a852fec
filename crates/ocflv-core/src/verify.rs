//! # Verification Engine
//!
//! Fetches an object's inventory, fans out one digest comparison per unit of
//! work, and aggregates the per-path outcomes into a [`VerificationErrors`]
//! report.
//!
//! Two modes:
//!
//! - **Ingest** (strict): every path of the head version is checked. For
//!   each manifest entry live in the head state, every head logical path of
//!   that entry is compared against the caller's digest for it, or reported
//!   as missing input. A caller may name a head path in its head-qualified
//!   physical form (`v00002/content/data/a.txt`); it is checked as the
//!   logical path unless that path was also supplied. Caller paths left over
//!   afterwards are not in the inventory.
//! - **Update** (relaxed): only the caller's paths are checked, each resolved
//!   through the path resolver so historical and deduplicated logical paths
//!   still find their content.
//!
//! Units run as independent tasks bounded by a semaphore. A failure fetching
//! one unit's digest becomes that path's entry, carrying the store error's
//! message; it never aborts sibling units.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::digest::{digests_match, normalize_etag};
use crate::error::{StoreError, VerificationError, VerificationErrors, VerifyError};
use crate::id::ObjectId;
use crate::inventory::Inventory;
use crate::key::{build_key, inventory_key};
use crate::store::ObjectStore;

/// Default bound on concurrently running verification units.
pub const DEFAULT_CONCURRENCY: usize = 32;

/// Which reconciliation rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerifyMode {
    Ingest,
    Update,
}

impl VerifyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ingest => "ingest",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for VerifyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type ErrorMap = Arc<DashMap<String, VerificationError>>;

/// Verification engine over an object store.
pub struct Verifier<S: ObjectStore + ?Sized> {
    store: Arc<S>,
    concurrency: usize,
}

impl<S: ObjectStore + ?Sized> Clone for Verifier<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            concurrency: self.concurrency,
        }
    }
}

impl<S: ObjectStore + ?Sized> fmt::Debug for Verifier<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verifier")
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

impl<S: ObjectStore + ?Sized + 'static> Verifier<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Bound the number of concurrently running units. Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Fetch and parse the inventory of object `id`.
    pub async fn fetch_inventory(&self, id: ObjectId) -> Result<Inventory, VerifyError> {
        let key = inventory_key(id);
        let bytes = match self.store.fetch(&key).await {
            Ok(bytes) => bytes,
            Err(StoreError::NotFound { .. }) => {
                return Err(VerifyError::InventoryNotFound { id: id.to_string() })
            }
            Err(err) => return Err(err.into()),
        };
        let inventory = Inventory::from_slice(&bytes)?;
        tracing::debug!(
            %id,
            head = %inventory.head,
            versions = inventory.versions.len(),
            manifest = inventory.manifest_len(),
            "fetched inventory"
        );
        Ok(inventory)
    }

    /// Run a verification in the given mode.
    pub async fn verify(
        &self,
        mode: VerifyMode,
        id: ObjectId,
        expected: HashMap<String, String>,
    ) -> Result<(), VerifyError> {
        match mode {
            VerifyMode::Ingest => self.verify_ingest(id, expected).await,
            VerifyMode::Update => self.verify_update(id, expected).await,
        }
    }

    /// Strict verification: every head path must be supplied and match.
    pub async fn verify_ingest(
        &self,
        id: ObjectId,
        expected: HashMap<String, String>,
    ) -> Result<(), VerifyError> {
        tracing::info!(%id, mode = "ingest", inputs = expected.len(), "verifying object");

        let inventory = self.fetch_inventory(id).await?;
        let dropped = inventory.reduce_manifest();
        if dropped > 0 {
            tracing::debug!(%id, dropped, "dropped manifest entries not in head state");
        }

        let expected = Arc::new(canonical_input(&inventory, expected));
        let errors: ErrorMap = Arc::new(DashMap::new());

        for path in inventory.unmanifested_head_paths() {
            expected.remove(path);
            errors.insert(path.to_string(), VerificationError::not_found());
        }

        let mut units = Vec::new();
        for entry in inventory.head_entries() {
            let key = build_key(id, &entry.location);
            for path in entry.paths {
                let store = self.store.clone();
                let expected = expected.clone();
                let errors = errors.clone();
                let key = key.clone();
                units.push(async move {
                    let supplied = expected.remove(&path).map(|(_, digest)| digest);
                    let outcome = match check_digest(store.as_ref(), &key, supplied.as_deref()).await {
                        Ok(()) if supplied.is_none() => Some(VerificationError::missing_input()),
                        Ok(()) => None,
                        Err(err) => Some(err),
                    };
                    if let Some(err) = outcome {
                        errors.insert(path, err);
                    }
                });
            }
        }
        self.fan_out(units).await?;

        for entry in expected.iter() {
            errors.insert(entry.key().clone(), VerificationError::not_found());
        }

        finish(id, VerifyMode::Ingest, errors)
    }

    /// Relaxed verification: only the supplied paths are checked.
    pub async fn verify_update(
        &self,
        id: ObjectId,
        expected: HashMap<String, String>,
    ) -> Result<(), VerifyError> {
        tracing::info!(%id, mode = "update", inputs = expected.len(), "verifying object");

        let inventory = Arc::new(self.fetch_inventory(id).await?);
        let errors: ErrorMap = Arc::new(DashMap::new());

        let units = expected.into_iter().map(|(path, digest)| {
            let store = self.store.clone();
            let inventory = inventory.clone();
            let errors = errors.clone();
            async move {
                let Some(location) = inventory.resolve(&path) else {
                    errors.insert(path, VerificationError::not_found());
                    return;
                };
                if !inventory.contains_head_path(&path) {
                    tracing::debug!(%id, path = %path, location = %location, "resolved outside the head state");
                }
                let key = build_key(id, &location);
                if let Err(err) = check_digest(store.as_ref(), &key, Some(&digest)).await {
                    errors.insert(path, err);
                }
            }
        });
        self.fan_out(units).await?;

        finish(id, VerifyMode::Update, errors)
    }

    async fn fan_out<I, F>(&self, units: I) -> Result<(), VerifyError>
    where
        I: IntoIterator<Item = F>,
        F: Future<Output = ()> + Send + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for unit in units {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| VerifyError::Task(format!("semaphore acquire error: {e}")))?;
            tasks.spawn(async move {
                let _permit = permit;
                unit.await
            });
        }

        while let Some(result) = tasks.join_next().await {
            result.map_err(|e| VerifyError::Task(format!("task join error: {e}")))?;
        }
        Ok(())
    }
}

/// Fetch the digest stored under `key` and compare it with `expected`.
///
/// With no expected digest only the fetch is checked.
async fn check_digest<S: ObjectStore + ?Sized>(
    store: &S,
    key: &str,
    expected: Option<&str>,
) -> Result<(), VerificationError> {
    let metadata = store.head_metadata(key).await.map_err(|err| {
        tracing::error!(key, error = %err, "failed to get head object of manifest entry");
        VerificationError::from_message(err.to_string())
    })?;
    match expected {
        Some(expected) if !digests_match(expected, &metadata.content_digest) => Err(
            VerificationError::mismatch(expected, normalize_etag(&metadata.content_digest)),
        ),
        _ => Ok(()),
    }
}

/// Key the caller's digests by head logical path where a head-qualified
/// physical form was supplied. A logical path supplied directly keeps
/// precedence; the physical alias then stays as given.
fn canonical_input(inventory: &Inventory, expected: HashMap<String, String>) -> DashMap<String, String> {
    let canonical = DashMap::with_capacity(expected.len());
    for (path, digest) in &expected {
        let key = match inventory.head_logical_path(path) {
            Some(logical) if logical != path.as_str() && !expected.contains_key(logical) => logical,
            _ => path.as_str(),
        };
        canonical.insert(key.to_string(), digest.clone());
    }
    canonical
}

fn finish(id: ObjectId, mode: VerifyMode, errors: ErrorMap) -> Result<(), VerifyError> {
    let errors: VerificationErrors = errors
        .iter()
        .map(|entry| (entry.key().clone(), entry.value().clone()))
        .collect();
    if errors.is_empty() {
        tracing::info!(%id, %mode, "verification succeeded");
        Ok(())
    } else {
        tracing::warn!(%id, %mode, errors = errors.len(), "verification failed");
        Err(VerifyError::Failed(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ObjectMetadata;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const INVENTORY: &str = r#"{
        "id": "URN-3:HUL.DRS.OBJECT:11112222",
        "digestAlgorithm": "sha512",
        "head": "v00002",
        "manifest": {
            "d1": ["v00001/content/data/a.txt"],
            "d2": ["v00001/content/data/b.txt"],
            "d3": ["v00002/content/data/b.txt"]
        },
        "versions": {
            "v00001": { "state": { "d1": ["data/a.txt"], "d2": ["data/b.txt"] } },
            "v00002": { "state": { "d1": ["data/a.txt"], "d3": ["data/b.txt"] } }
        }
    }"#;

    const ID: ObjectId = ObjectId(11_112_222);

    #[derive(Default)]
    struct FakeStore {
        objects: DashMap<String, (Vec<u8>, String)>,
        heads: AtomicUsize,
    }

    impl FakeStore {
        fn put(&self, key: String, body: &[u8], etag: &str) {
            self.objects.insert(key, (body.to_vec(), etag.to_string()));
        }
    }

    #[async_trait::async_trait]
    impl ObjectStore for FakeStore {
        async fn fetch(&self, key: &str) -> Result<Vec<u8>, StoreError> {
            self.objects
                .get(key)
                .map(|o| o.0.clone())
                .ok_or_else(|| StoreError::NotFound { key: key.to_string() })
        }

        async fn head_metadata(&self, key: &str) -> Result<ObjectMetadata, StoreError> {
            self.heads.fetch_add(1, Ordering::SeqCst);
            self.objects
                .get(key)
                .map(|o| ObjectMetadata::with_digest(o.1.clone()))
                .ok_or_else(|| StoreError::NotFound { key: key.to_string() })
        }
    }

    fn store() -> Arc<FakeStore> {
        let store = FakeStore::default();
        store.put(inventory_key(ID), INVENTORY.as_bytes(), "\"inv\"");
        store.put(build_key(ID, "v00001/content/data/a.txt"), b"a", "\"d1\"");
        store.put(build_key(ID, "v00001/content/data/b.txt"), b"b1", "\"d2\"");
        store.put(build_key(ID, "v00002/content/data/b.txt"), b"b2", "\"d3\"");
        Arc::new(store)
    }

    fn input(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn ingest_succeeds_for_exact_head_state() {
        let verifier = Verifier::new(store());
        verifier
            .verify_ingest(ID, input(&[("data/a.txt", "d1"), ("data/b.txt", "d3")]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn ingest_reports_mismatch_missing_and_unknown() {
        let verifier = Verifier::new(store());
        let err = verifier
            .verify_ingest(ID, input(&[("data/a.txt", "bad"), ("data/c.txt", "d9")]))
            .await
            .unwrap_err();
        let errors = err.verification_errors().unwrap();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get("data/a.txt").unwrap(), &VerificationError::mismatch("bad", "d1"));
        assert_eq!(errors.get("data/b.txt").unwrap(), &VerificationError::missing_input());
        assert_eq!(errors.get("data/c.txt").unwrap(), &VerificationError::not_found());
    }

    #[tokio::test]
    async fn ingest_accepts_head_qualified_physical_paths() {
        let verifier = Verifier::new(store());
        verifier
            .verify_ingest(
                ID,
                input(&[("v00002/content/data/a.txt", "d1"), ("v00002/content/data/b.txt", "d3")]),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn ingest_prefers_logical_key_over_physical_alias() {
        let verifier = Verifier::new(store());
        let err = verifier
            .verify_ingest(
                ID,
                input(&[
                    ("data/a.txt", "d1"),
                    ("data/b.txt", "d3"),
                    ("v00002/content/data/b.txt", "d3"),
                    ("v00001/content/data/b.txt", "d2"),
                ]),
            )
            .await
            .unwrap_err();
        let errors = err.verification_errors().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.get("v00002/content/data/b.txt").unwrap(),
            &VerificationError::not_found()
        );
        assert_eq!(
            errors.get("v00001/content/data/b.txt").unwrap(),
            &VerificationError::not_found()
        );
    }

    #[test]
    fn canonical_input_maps_physical_head_keys() {
        let inventory = Inventory::from_slice(INVENTORY.as_bytes()).unwrap();
        let canonical = canonical_input(&inventory, input(&[("v00002/content/data/a.txt", "d1")]));
        assert_eq!(canonical.get("data/a.txt").map(|d| d.value().clone()), Some("d1".to_string()));
        assert!(canonical.get("v00002/content/data/a.txt").is_none());
    }

    #[tokio::test]
    async fn update_checks_only_supplied_paths() {
        let verifier = Verifier::new(store());
        verifier
            .verify_update(ID, input(&[("data/a.txt", "d1")]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_reports_unknown_path_without_missing_input() {
        let verifier = Verifier::new(store());
        let err = verifier
            .verify_update(ID, input(&[("data/zzz.txt", "d1")]))
            .await
            .unwrap_err();
        let errors = err.verification_errors().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("data/zzz.txt").unwrap(), &VerificationError::not_found());
    }

    #[tokio::test]
    async fn fetch_failure_carries_store_message() {
        let store = store();
        store.objects.remove(&build_key(ID, "v00001/content/data/a.txt"));
        let verifier = Verifier::new(store);
        let err = verifier
            .verify_update(ID, input(&[("data/a.txt", "d1")]))
            .await
            .unwrap_err();
        let entry = err.verification_errors().unwrap().get("data/a.txt").unwrap().clone();
        assert_eq!(
            entry.error,
            "object not found: 2222/1111/11112222/v00001/content/data/a.txt"
        );
        assert!(entry.expected.is_none());
    }

    #[tokio::test]
    async fn missing_inventory_is_request_level() {
        let verifier = Verifier::new(Arc::new(FakeStore::default()));
        let err = verifier.verify_ingest(ID, HashMap::new()).await.unwrap_err();
        assert!(matches!(err, VerifyError::InventoryNotFound { id } if id == "11112222"));
    }

    #[tokio::test]
    async fn malformed_inventory_is_request_level() {
        let store = FakeStore::default();
        store.put(inventory_key(ID), b"not json", "\"x\"");
        let verifier = Verifier::new(Arc::new(store));
        let err = verifier.verify_update(ID, HashMap::new()).await.unwrap_err();
        assert!(matches!(err, VerifyError::Inventory(_)));
    }

    #[tokio::test]
    async fn works_through_trait_object() {
        let store: Arc<dyn ObjectStore> = store();
        let verifier = Verifier::new(store).with_concurrency(1);
        verifier
            .verify(VerifyMode::Update, ID, input(&[("data/b.txt", "d3")]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn repeated_runs_are_idempotent() {
        let store = store();
        let verifier = Verifier::new(store.clone()).with_concurrency(0);
        assert_eq!(verifier.concurrency(), 1);
        let expected = input(&[("data/a.txt", "d1"), ("data/b.txt", "d3")]);
        verifier.verify_ingest(ID, expected.clone()).await.unwrap();
        verifier.verify_ingest(ID, expected).await.unwrap();
        assert_eq!(store.heads.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn mode_display() {
        assert_eq!(VerifyMode::Ingest.to_string(), "ingest");
        assert_eq!(VerifyMode::Update.as_str(), "update");
    }
}
