//! # Error Model
//!
//! Two layers of failure:
//!
//! - **Per-path entries** ([`VerificationError`]) collected into a
//!   [`VerificationErrors`] report. A failed verification is a normal outcome
//!   and the report is the payload the caller acts on.
//! - **Request-level failures** ([`VerifyError`]) that stop a verification
//!   before any per-path work can run, plus the collaborator errors it wraps.
//!
//! Built with `thiserror`. No `Box<dyn Error>`, no `.unwrap()` outside tests.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message for a path whose stored digest differs from the supplied one.
pub const CHECKSUM_MISMATCH: &str = "Checksums do not match";
/// Message for an inventory path the caller supplied no digest for.
pub const MISSING_INPUT: &str = "Missing input checksum";
/// Message for a caller path that cannot be located in the inventory.
pub const NOT_FOUND: &str = "Not found in inventory manifest";

/// A single path's verification failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationError {
    /// Human-readable description of the failure.
    pub error: String,
    /// Digest supplied by the caller, when relevant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Digest reported by the object store, when relevant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl VerificationError {
    /// The stored digest differs from the supplied one.
    pub fn mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            error: CHECKSUM_MISMATCH.to_string(),
            expected: Some(expected.into()),
            actual: Some(actual.into()),
        }
    }

    /// The inventory holds a path the caller did not supply.
    pub fn missing_input() -> Self {
        Self::from_message(MISSING_INPUT)
    }

    /// The caller supplied a path the inventory does not hold.
    pub fn not_found() -> Self {
        Self::from_message(NOT_FOUND)
    }

    /// Any other failure, typically a store error's message carried verbatim.
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            expected: None,
            actual: None,
        }
    }
}

impl fmt::Display for VerificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.expected, &self.actual) {
            (Some(expected), Some(actual)) => {
                write!(f, "{} (expected {expected}, actual {actual})", self.error)
            }
            _ => f.write_str(&self.error),
        }
    }
}

/// Aggregated per-path failures of one verification call.
///
/// Keyed by caller path (or inventory logical path); a path carries at most
/// one entry. Serializes as a plain JSON object so the HTTP layer can return
/// it unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerificationErrors(BTreeMap<String, VerificationError>);

impl VerificationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `error` for `path`, replacing any earlier entry.
    pub fn insert(&mut self, path: impl Into<String>, error: VerificationError) {
        self.0.insert(path.into(), error);
    }

    pub fn get(&self, path: &str) -> Option<&VerificationError> {
        self.0.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &VerificationError)> {
        self.0.iter()
    }

    pub fn into_inner(self) -> BTreeMap<String, VerificationError> {
        self.0
    }
}

impl FromIterator<(String, VerificationError)> for VerificationErrors {
    fn from_iter<I: IntoIterator<Item = (String, VerificationError)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for VerificationErrors {
    type Item = (String, VerificationError);
    type IntoIter = std::collections::btree_map::IntoIter<String, VerificationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Failures reported by an object-store collaborator.
///
/// The `Display` text of each variant is what ends up verbatim in a path's
/// fetch-failure entry, so it names the key and the cause.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No object under the key.
    #[error("object not found: {key}")]
    NotFound {
        /// Physical key that was requested.
        key: String,
    },

    /// The store refused access to the key.
    #[error("access denied: {key}")]
    AccessDenied { key: String },

    /// Any other non-success status.
    #[error("store returned status {status} for {key}: {body}")]
    Status {
        key: String,
        status: u16,
        /// Response body, truncated by the backend.
        body: String,
    },

    /// The request never produced a response.
    #[error("transport error for {key}: {message}")]
    Transport { key: String, message: String },

    /// A response arrived but lacked what the contract requires.
    #[error("invalid response for {key}: {reason}")]
    InvalidResponse { key: String, reason: String },

    /// The backend could not be constructed.
    #[error("store configuration error: {0}")]
    Config(String),
}

/// Failures while reading an inventory document.
#[derive(Error, Debug)]
pub enum InventoryError {
    /// The document is not valid JSON or does not fit the inventory shape.
    #[error("malformed inventory: {0}")]
    Parse(#[from] serde_json::Error),

    /// `head` names a version the document does not contain.
    #[error("head version {head} is not present in versions")]
    UnknownHead { head: String },

    /// `head` is empty.
    #[error("inventory head is empty")]
    EmptyHead,

    /// A manifest digest maps to no locations.
    #[error("manifest entry {digest} has no locations")]
    EmptyLocations { digest: String },
}

/// Request-level verification failure.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// The store holds no inventory for the object.
    #[error("inventory not found for object {id}")]
    InventoryNotFound { id: String },

    /// The inventory exists but could not be read.
    #[error("inventory error: {0}")]
    Inventory(#[from] InventoryError),

    /// The inventory fetch failed for a reason other than absence.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Verification ran and found problems.
    #[error("verification failed with {} error(s)", .0.len())]
    Failed(VerificationErrors),

    /// A worker task panicked or was cancelled.
    #[error("verification task failed: {0}")]
    Task(String),
}

impl VerifyError {
    /// The per-path report, when this is a verification failure.
    pub fn verification_errors(&self) -> Option<&VerificationErrors> {
        match self {
            Self::Failed(errors) => Some(errors),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_serializes_all_fields() {
        let value = serde_json::to_value(VerificationError::mismatch("abc", "def")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "error": "Checksums do not match",
                "expected": "abc",
                "actual": "def"
            })
        );
    }

    #[test]
    fn absent_fields_are_omitted() {
        let value = serde_json::to_value(VerificationError::not_found()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "error": "Not found in inventory manifest" })
        );
    }

    #[test]
    fn report_serializes_as_plain_object() {
        let mut errors = VerificationErrors::new();
        errors.insert("b.txt", VerificationError::missing_input());
        errors.insert("a.txt", VerificationError::from_message("object not found: k"));
        let value = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "a.txt": { "error": "object not found: k" },
                "b.txt": { "error": "Missing input checksum" }
            })
        );
    }

    #[test]
    fn later_insert_replaces_earlier_entry() {
        let mut errors = VerificationErrors::new();
        errors.insert("a.txt", VerificationError::not_found());
        errors.insert("a.txt", VerificationError::mismatch("x", "y"));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("a.txt").unwrap().error, CHECKSUM_MISMATCH);
    }

    #[test]
    fn store_error_messages_name_the_key() {
        let err = StoreError::NotFound {
            key: "4264/5210/1254624/inventory.json".into(),
        };
        assert_eq!(
            err.to_string(),
            "object not found: 4264/5210/1254624/inventory.json"
        );
    }

    #[test]
    fn failed_display_counts_entries() {
        let errors: VerificationErrors = vec![
            ("a".to_string(), VerificationError::not_found()),
            ("b".to_string(), VerificationError::missing_input()),
        ]
        .into_iter()
        .collect();
        let err = VerifyError::Failed(errors);
        assert_eq!(err.to_string(), "verification failed with 2 error(s)");
        assert_eq!(err.verification_errors().unwrap().len(), 2);
    }

    #[test]
    fn verification_error_display_includes_digests() {
        let err = VerificationError::mismatch("aa", "bb");
        assert_eq!(
            err.to_string(),
            "Checksums do not match (expected aa, actual bb)"
        );
    }
}
