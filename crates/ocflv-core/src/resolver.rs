//! # Path Resolver
//!
//! Maps a caller-supplied path fragment to one physical location in the
//! working manifest, consuming the matched entry.
//!
//! Search order:
//!
//! 1. Current manifest: a location ending with the fragment on a segment
//!    boundary. Among several matching digests the newest version's copy
//!    wins, ordering locations by their leading version label the same way
//!    [`Inventory::versions_newest_first`] does.
//! 2. Version history, newest to oldest: a digest whose state lists the
//!    fragment exactly and which is still in the working manifest. The
//!    location is rebuilt as `{version}/{contentDirectory}/{fragment}` for the
//!    version that matched.
//!
//! Consumption is an atomic remove on the working manifest. Two fragments
//! aliasing one digest resolve at most once between them: whichever caller
//! removes the entry first gets the location, and the other resolves to
//! `None` even if an older copy is still live. Which caller wins under
//! concurrency is unspecified.

use std::cmp::Ordering;

use crate::inventory::{version_ordinal, Inventory};

/// Outcome of a search, before consumption.
#[derive(Debug)]
enum Candidate {
    /// Step 1 hit; the location comes from the removed entry.
    Manifest { digest: String },
    /// Step 2 hit, with the synthesized location.
    History { digest: String, location: String },
}

impl Candidate {
    fn digest(&self) -> &str {
        match self {
            Self::Manifest { digest } | Self::History { digest, .. } => digest,
        }
    }
}

/// Order physical locations by their leading version label, then lexically.
fn location_order(a: &str, b: &str) -> Ordering {
    let label = |location: &str| location.split('/').next().and_then(version_ordinal);
    label(a).cmp(&label(b)).then_with(|| a.cmp(b))
}

/// `location` ends with `fragment` and the match starts at a path segment.
fn ends_on_segment(location: &str, fragment: &str) -> bool {
    match location.strip_suffix(fragment) {
        Some("") => true,
        Some(rest) => rest.ends_with('/'),
        None => false,
    }
}

impl Inventory {
    /// Resolve `fragment` to a physical location relative to the object root,
    /// removing the matched digest from the working manifest.
    ///
    /// Returns `None` when nothing in the manifest or the version history
    /// matches, or every match has already been consumed.
    pub fn resolve(&self, fragment: &str) -> Option<String> {
        if fragment.is_empty() {
            return None;
        }
        let candidate = self.find_candidate(fragment)?;
        let Some((digest, locations)) = self.manifest.remove(candidate.digest()) else {
            tracing::debug!(
                fragment,
                digest = candidate.digest(),
                "manifest entry consumed concurrently"
            );
            return None;
        };
        match candidate {
            Candidate::History { location, .. } => Some(location),
            Candidate::Manifest { .. } => {
                let first = locations.into_iter().next();
                if first.is_none() {
                    tracing::warn!(digest = %digest, "manifest entry had no locations");
                }
                first
            }
        }
    }

    fn find_candidate(&self, fragment: &str) -> Option<Candidate> {
        self.find_in_manifest(fragment)
            .map(|digest| Candidate::Manifest { digest })
            .or_else(|| self.find_in_history(fragment))
    }

    fn find_in_manifest(&self, fragment: &str) -> Option<String> {
        let mut best: Option<(String, String)> = None;
        for entry in self.manifest.iter() {
            let Some(location) = entry
                .value()
                .iter()
                .filter(|location| ends_on_segment(location, fragment))
                .max_by(|a, b| location_order(a, b))
            else {
                continue;
            };
            let better = match &best {
                Some((current, _)) => location_order(location, current).is_gt(),
                None => true,
            };
            if better {
                best = Some((location.clone(), entry.key().clone()));
            }
        }
        best.map(|(_, digest)| digest)
    }

    fn find_in_history(&self, fragment: &str) -> Option<Candidate> {
        self.versions_newest_first().into_iter().find_map(|label| {
            let version = self.versions.get(label)?;
            let digest = version.state.iter().find_map(|(digest, paths)| {
                (paths.iter().any(|path| path == fragment)
                    && self.manifest.contains_key(digest.as_str()))
                .then(|| digest.clone())
            })?;
            Some(Candidate::History {
                digest,
                location: format!("{label}/{}/{fragment}", self.content_directory),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Version 2 renames `data/old.txt` to `data/new.txt` without new content,
    /// and stores a second copy of `meta/a.xml` under a new name.
    const RENAMED: &str = r#"{
        "id": "URN-3:HUL.DRS.OBJECT:7",
        "digestAlgorithm": "sha512",
        "head": "v00002",
        "contentDirectory": "content",
        "manifest": {
            "d-old": ["v00001/content/data/old.txt"],
            "d-meta": ["v00001/content/meta/a.xml"],
            "d-desc1": ["v00001/content/descriptor/mets.xml"],
            "d-desc2": ["v00002/content/descriptor/mets.xml"]
        },
        "versions": {
            "v00001": {
                "state": {
                    "d-old": ["data/old.txt"],
                    "d-meta": ["meta/a.xml"],
                    "d-desc1": ["descriptor/mets.xml"]
                }
            },
            "v00002": {
                "state": {
                    "d-old": ["data/new.txt"],
                    "d-meta": ["meta/a.xml", "meta/b.xml"],
                    "d-desc2": ["descriptor/mets.xml"]
                }
            }
        }
    }"#;

    fn inventory() -> Inventory {
        Inventory::from_slice(RENAMED.as_bytes()).unwrap()
    }

    #[test]
    fn suffix_match_returns_location_and_consumes_one_entry() {
        let inv = inventory();
        let before = inv.manifest_len();
        let location = inv.resolve("data/old.txt").unwrap();
        assert!(location.ends_with("data/old.txt"));
        assert_eq!(inv.manifest_len(), before - 1);
        assert!(inv.manifest_locations("d-old").is_none());
    }

    #[test]
    fn suffix_match_requires_segment_boundary() {
        let inv = inventory();
        assert_eq!(inv.resolve("ld.txt"), None);
        assert_eq!(inv.manifest_len(), 4);
    }

    #[test]
    fn greatest_location_wins_among_suffix_matches() {
        let inv = inventory();
        assert_eq!(
            inv.resolve("descriptor/mets.xml").unwrap(),
            "v00002/content/descriptor/mets.xml"
        );
        assert_eq!(
            inv.resolve("descriptor/mets.xml").unwrap(),
            "v00001/content/descriptor/mets.xml"
        );
        assert_eq!(inv.resolve("descriptor/mets.xml"), None);
    }

    #[test]
    fn unpadded_labels_prefer_the_numerically_newest_copy() {
        let doc = r#"{
            "id": "x", "head": "v10",
            "manifest": {
                "d9": ["v9/content/a.txt"],
                "d10": ["v10/content/a.txt"]
            },
            "versions": {
                "v9": { "state": { "d9": ["a.txt"] } },
                "v10": { "state": { "d10": ["a.txt"] } }
            }
        }"#;
        let inv = Inventory::from_slice(doc.as_bytes()).unwrap();
        assert_eq!(inv.versions_newest_first(), vec!["v10", "v9"]);
        assert_eq!(inv.resolve("a.txt").unwrap(), "v10/content/a.txt");
        assert_eq!(inv.resolve("a.txt").unwrap(), "v9/content/a.txt");
    }

    #[test]
    fn location_order_compares_version_numbers_first() {
        assert!(location_order("v10/content/a.txt", "v9/content/a.txt").is_gt());
        assert!(location_order("v00002/content/a", "v00001/content/b").is_gt());
        assert!(location_order("v1/content/b", "v1/content/a").is_gt());
    }

    #[test]
    fn renamed_path_resolves_through_history() {
        let inv = inventory();
        assert_eq!(
            inv.resolve("data/new.txt").unwrap(),
            "v00002/content/data/new.txt"
        );
        assert!(inv.manifest_locations("d-old").is_none());
    }

    #[test]
    fn deduplicated_logical_path_resolves_while_entry_is_live() {
        let inv = inventory();
        assert_eq!(
            inv.resolve("meta/b.xml").unwrap(),
            "v00002/content/meta/b.xml"
        );
        // the shared digest is now consumed
        assert_eq!(inv.resolve("meta/a.xml"), None);
    }

    #[test]
    fn history_resolution_uses_matching_older_version() {
        let doc = r#"{
            "id": "x", "head": "v3", "contentDirectory": "files",
            "manifest": { "d1": ["v1/files/a.txt"] },
            "versions": {
                "v1": { "state": { "d1": ["a.txt"] } },
                "v2": { "state": { "d1": ["b.txt"] } },
                "v3": { "state": { "d1": ["c.txt"] } }
            }
        }"#;
        let inv = Inventory::from_slice(doc.as_bytes()).unwrap();
        assert_eq!(inv.resolve("b.txt").unwrap(), "v2/files/b.txt");
    }

    #[test]
    fn history_skips_digests_no_longer_in_manifest() {
        let inv = inventory();
        inv.reduce_manifest();
        // d-desc1 is only in v00001; reduction removed it
        assert_eq!(inv.manifest_locations("d-desc1"), None);
        assert_eq!(
            inv.resolve("descriptor/mets.xml").unwrap(),
            "v00002/content/descriptor/mets.xml"
        );
        assert_eq!(inv.resolve("descriptor/mets.xml"), None);
    }

    #[test]
    fn unknown_and_empty_fragments_do_not_resolve() {
        let inv = inventory();
        assert_eq!(inv.resolve("data/missing.txt"), None);
        assert_eq!(inv.resolve(""), None);
        assert_eq!(inv.manifest_len(), 4);
    }

    #[test]
    fn segment_boundary_helper() {
        assert!(ends_on_segment("v1/content/a.txt", "a.txt"));
        assert!(ends_on_segment("a.txt", "a.txt"));
        assert!(!ends_on_segment("v1/content/ba.txt", "a.txt"));
        assert!(!ends_on_segment("a.txt", "b.txt"));
    }

    #[test]
    fn concurrent_aliases_resolve_once() {
        let inv = std::sync::Arc::new(inventory());
        let handles: Vec<_> = ["meta/a.xml", "meta/b.xml"]
            .into_iter()
            .map(|fragment| {
                let inv = inv.clone();
                std::thread::spawn(move || inv.resolve(fragment))
            })
            .collect();
        let resolved = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(Option::is_some)
            .count();
        assert_eq!(resolved, 1);
    }
}
