//! # ocflv-core: Inventory Resolution and Verification
//!
//! Verifies that objects preserved in an OCFL-style, versioned,
//! content-addressable storage layout still match caller-supplied checksums
//! after an ingest or update event.
//!
//! ## Components
//!
//! - [`inventory`]: the manifest model: `inventory.json` parsed into a fixed
//!   tagged structure with a concurrently mutable working manifest.
//! - [`resolver`]: maps caller path fragments (current, historical, or
//!   deduplicated logical paths) to one physical manifest location.
//! - [`key`]: deterministic sharded storage key construction.
//! - [`store`]: the object-store contract the engine calls.
//! - [`verify`]: the verification engine (strict ingest and relaxed update).
//! - [`error`]: per-path error entries and request-level failures.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ocflv-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.
//! - Nothing here writes to the backing store. Mutation is confined to the
//!   per-request working copy of the manifest.

pub mod digest;
pub mod error;
pub mod id;
pub mod inventory;
pub mod key;
pub mod resolver;
pub mod store;
pub mod verify;

pub use error::{InventoryError, StoreError, VerificationError, VerificationErrors, VerifyError};
pub use id::ObjectId;
pub use inventory::{Inventory, User, Version};
pub use key::{build_key, inventory_key, reduce_key, INVENTORY_FILE};
pub use store::{ObjectMetadata, ObjectStore};
pub use verify::{VerifyMode, Verifier, DEFAULT_CONCURRENCY};
