//! # Manifest Model
//!
//! In-memory form of an OCFL `inventory.json`. The document is parsed into a
//! fixed structure and checked before anything else sees it; a document that
//! parses but names a missing head, or maps a digest to no locations, is
//! rejected rather than tolerated.
//!
//! The manifest is the one mutable part. It is a per-request working copy in
//! a [`DashMap`] so that concurrent verification units can consume entries
//! with an atomic remove. The version history is immutable after parsing.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::Read;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::InventoryError;
use crate::key::reduce_key;

/// Default OCFL content directory name.
pub const DEFAULT_CONTENT_DIRECTORY: &str = "content";

fn default_content_directory() -> String {
    DEFAULT_CONTENT_DIRECTORY.to_string()
}

/// Author of a version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// One immutable version snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub user: User,
    /// Digest to the logical paths valid at this version.
    #[serde(default)]
    pub state: BTreeMap<String, Vec<String>>,
}

impl Version {
    /// Digest whose state lists `path` exactly.
    pub fn digest_for(&self, path: &str) -> Option<&str> {
        self.state
            .iter()
            .find(|(_, paths)| paths.iter().any(|p| p == path))
            .map(|(digest, _)| digest.as_str())
    }
}

/// Wire shape of the document, before validation.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InventoryDocument {
    id: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    digest_algorithm: String,
    head: String,
    #[serde(default = "default_content_directory")]
    content_directory: String,
    #[serde(default)]
    fixity: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    manifest: HashMap<String, Vec<String>>,
    versions: BTreeMap<String, Version>,
}

/// A manifest entry referenced by the head version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadEntry {
    pub digest: String,
    /// First physical location of the digest, relative to the object root.
    pub location: String,
    /// Logical paths under which the head version exposes the content.
    pub paths: Vec<String>,
}

/// A parsed, validated inventory with a working manifest.
#[derive(Debug, Clone)]
pub struct Inventory {
    pub id: String,
    pub kind: String,
    pub digest_algorithm: String,
    pub head: String,
    pub content_directory: String,
    pub fixity: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    pub(crate) manifest: DashMap<String, Vec<String>>,
    pub versions: BTreeMap<String, Version>,
}

impl Inventory {
    /// Parse and validate an inventory document.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, InventoryError> {
        let document: InventoryDocument = serde_json::from_slice(bytes)?;
        Self::from_document(document)
    }

    /// Parse and validate an inventory document from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, InventoryError> {
        let document: InventoryDocument = serde_json::from_reader(reader)?;
        Self::from_document(document)
    }

    fn from_document(document: InventoryDocument) -> Result<Self, InventoryError> {
        if document.head.is_empty() {
            return Err(InventoryError::EmptyHead);
        }
        if !document.versions.contains_key(&document.head) {
            return Err(InventoryError::UnknownHead {
                head: document.head,
            });
        }
        if let Some((digest, _)) = document
            .manifest
            .iter()
            .find(|(_, locations)| locations.is_empty())
        {
            return Err(InventoryError::EmptyLocations {
                digest: digest.clone(),
            });
        }

        Ok(Self {
            id: document.id,
            kind: document.kind,
            digest_algorithm: document.digest_algorithm,
            head: document.head,
            content_directory: document.content_directory,
            fixity: document.fixity,
            manifest: document.manifest.into_iter().collect(),
            versions: document.versions,
        })
    }

    /// The head version. Present by construction.
    pub fn head_version(&self) -> &Version {
        // from_document rejects documents whose head is not in versions
        &self.versions[&self.head]
    }

    /// Every logical path in the head state, sorted.
    pub fn head_paths(&self) -> BTreeSet<&str> {
        self.head_version()
            .state
            .values()
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// Whether `path` exists in the head state, either as a logical path or
    /// in its version-qualified physical form (`v00002/content/a.txt`).
    pub fn contains_head_path(&self, path: &str) -> bool {
        self.head_logical_path(path).is_some()
    }

    /// The head logical path `path` names: `path` itself when the head state
    /// lists it, or the logical part of a head-qualified physical form.
    pub fn head_logical_path<'a>(&self, path: &'a str) -> Option<&'a str> {
        let head = self.head_version();
        if head.digest_for(path).is_some() {
            return Some(path);
        }
        let logical = reduce_key(&self.content_directory, path)?;
        let qualifier = &path[..path.len() - logical.len()];
        let head_qualifier = format!("{}/{}/", self.head, self.content_directory);
        (qualifier == head_qualifier && head.digest_for(logical).is_some()).then_some(logical)
    }

    /// Version labels, newest first.
    ///
    /// Labels are ordered by their numeric part (`v2` before `v10`), falling
    /// back to lexical order, which agrees for zero-padded labels.
    pub fn versions_newest_first(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.versions.keys().map(String::as_str).collect();
        labels.sort_by(|a, b| version_ordinal(b).cmp(&version_ordinal(a)).then(b.cmp(a)));
        labels
    }

    /// Drop manifest entries the head state does not reference.
    ///
    /// Returns the number of entries dropped.
    pub fn reduce_manifest(&self) -> usize {
        let live: BTreeSet<&str> = self
            .head_version()
            .state
            .keys()
            .map(String::as_str)
            .collect();
        let before = self.manifest.len();
        self.manifest.retain(|digest, _| live.contains(digest.as_str()));
        before - self.manifest.len()
    }

    /// Manifest entries referenced by the head state, in digest order.
    pub fn head_entries(&self) -> Vec<HeadEntry> {
        self.head_version()
            .state
            .iter()
            .filter_map(|(digest, paths)| {
                let location = self.manifest.get(digest)?.first()?.clone();
                Some(HeadEntry {
                    digest: digest.clone(),
                    location,
                    paths: paths.clone(),
                })
            })
            .collect()
    }

    /// Head logical paths whose digest has no manifest entry.
    pub fn unmanifested_head_paths(&self) -> Vec<&str> {
        self.head_version()
            .state
            .iter()
            .filter(|(digest, _)| !self.manifest.contains_key(digest.as_str()))
            .flat_map(|(_, paths)| paths.iter().map(String::as_str))
            .collect()
    }

    /// Number of entries left in the working manifest.
    pub fn manifest_len(&self) -> usize {
        self.manifest.len()
    }

    /// Locations currently recorded for `digest`.
    pub fn manifest_locations(&self, digest: &str) -> Option<Vec<String>> {
        self.manifest.get(digest).map(|entry| entry.value().clone())
    }
}

pub(crate) fn version_ordinal(label: &str) -> Option<u64> {
    label
        .trim_start_matches(|c: char| !c.is_ascii_digit())
        .parse()
        .ok()
}
