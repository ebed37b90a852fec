//! Digest normalization.
//!
//! The object store reports the content digest as an HTTP entity tag, which
//! arrives quoted (`"d41d8cd9..."`). Digests are never recomputed here; the
//! ETag is the actual digest once the quotes are gone.

/// Strip at most one leading and one trailing `"` from an ETag.
pub fn normalize_etag(etag: &str) -> &str {
    let etag = etag.strip_prefix('"').unwrap_or(etag);
    etag.strip_suffix('"').unwrap_or(etag)
}

/// Exact, case-sensitive digest comparison after ETag normalization.
pub fn digests_match(expected: &str, etag: &str) -> bool {
    expected == normalize_etag(etag)
}
