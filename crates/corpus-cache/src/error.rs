//! Cache error types.

use thiserror::Error;

/// Errors that can occur while persisting the cache.
///
/// Load-time problems are not errors: an unreadable cache file is
/// recovered by starting empty.
#[derive(Debug, Error)]
pub enum CacheError {
    /// IO error while writing the cache file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error while encoding the cache map
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
