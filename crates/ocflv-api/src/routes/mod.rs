//! # API Route Modules
//!
//! - `verify`: ingest and update verification of stored objects against
//!   caller-supplied digests.

pub mod verify;
