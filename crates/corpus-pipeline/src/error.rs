//! Pipeline error types.

use thiserror::Error;

use corpus_cache::CacheError;

/// Errors surfaced by a pipeline run.
///
/// Partial failures (individual documents without a usable embedding) are
/// not errors; they are dropped with a warning. A run only fails when it
/// cannot persist the cache or produces no usable output at all.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Cache persistence failed
    #[error("Cache persistence failed: {0}")]
    Cache(#[from] CacheError),

    /// Zero documents produced a valid embedding
    #[error("No documents produced a valid embedding")]
    NoValidNodes,
}
