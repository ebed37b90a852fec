//! # ocflv-cli: Operator CLI for OCFL Inventory Verification
//!
//! ## Subcommands
//!
//! - `ocflv verify` runs an ingest or update verification directly against
//!   the object store.
//! - `ocflv key` prints the storage key of an object's inventory or of a path
//!   inside it.
//! - `ocflv inspect` prints an inventory summary and resolves paths through
//!   its version history.
//!
//! ```bash
//! export OCFLV_STORE_ENDPOINT=http://minio:9000 OCFLV_STORE_BUCKET=preservation
//! ocflv verify --id 1254624 --input checksums.json
//! ocflv verify --id 1254624 --input changed.json --update
//! ocflv key --id 1254624 --path v00001/content/data/400000254.txt
//! ocflv inspect --id 101000305 --resolve data/400018806_master.jp2
//! ```

pub mod inspect;
pub mod key;
pub mod store;
pub mod verify;
