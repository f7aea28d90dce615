//! Content-addressed cache keys.

use sha2::{Digest, Sha256};

/// Derive the cache key for a document's text.
///
/// Deterministic: the same text always produces the same key, and the key
/// depends only on the text, never on the document id. Keys are lowercase
/// hex SHA-256 digests. A collision is treated as a cache hit; this is a
/// dedup key, not a security boundary.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
