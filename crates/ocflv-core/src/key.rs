//! # Storage Key Builder
//!
//! Objects live under a two-level sharded prefix derived from their
//! identifier: the decimal id is left-padded to eight digits, reversed, and
//! split into two four-character segments. Reversal puts the low-order
//! digits first so consecutive identifiers spread across shards.
//!
//! ```text
//! 11112222 -> "22221111" -> 2222/1111/11112222/<path>
//!        1 -> "10000000" -> 1000/0000/1/<path>
//! ```

use crate::id::ObjectId;

/// File name of the OCFL inventory at the object root.
pub const INVENTORY_FILE: &str = "inventory.json";

/// Minimum width of the zero-padded identifier before reversal.
const SHARD_WIDTH: usize = 8;

/// Build the physical storage key for `path` under object `id`.
pub fn build_key(id: ObjectId, path: &str) -> String {
    let reversed: Vec<char> = format!("{:0>width$}", id.get(), width = SHARD_WIDTH)
        .chars()
        .rev()
        .collect();
    let first: String = reversed[0..4].iter().collect();
    let second: String = reversed[4..8].iter().collect();
    format!("{first}/{second}/{id}/{path}")
}

/// Storage key of the inventory document for `id`.
pub fn inventory_key(id: ObjectId) -> String {
    build_key(id, INVENTORY_FILE)
}

/// Strip everything up to and including `"{content_directory}/"` from a
/// physical location, leaving its logical path.
///
/// Returns `None` when the location does not contain the content directory
/// as a path segment.
pub fn reduce_key<'a>(content_directory: &str, location: &'a str) -> Option<&'a str> {
    let marker = format!("{content_directory}/");
    if let Some(rest) = location.strip_prefix(marker.as_str()) {
        return Some(rest);
    }
    let segment = format!("/{marker}");
    location
        .find(segment.as_str())
        .map(|at| &location[at + segment.len()..])
}
