//! # corpus-provider
//!
//! Embedding provider client and resilient batch generation.
//!
//! The provider surface is two operations: batch embedding (ordered texts
//! to ordered vectors, may fail wholesale) and single-item embedding. The
//! [`BatchEmbeddingGenerator`] layers chunking, bounded retry with
//! exponential backoff, and per-item fallback on top, so that one bad
//! input degrades to a positional absence instead of failing a run.

pub mod generator;
pub mod mock;
pub mod openai;
pub mod retry;

pub use generator::BatchEmbeddingGenerator;
pub use mock::MockProvider;
pub use openai::{OpenAiProvider, OpenAiProviderConfig};
pub use retry::RetryPolicy;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("API request failed: {0}")]
    Api(String),

    #[error("Failed to parse API response: {0}")]
    Parse(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ProviderError {
    /// Whether a retry of the same call could plausibly succeed.
    ///
    /// Transport and rate-limit failures are transient; configuration and
    /// response-shape problems are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::Api(_) | ProviderError::RateLimited)
    }
}

/// External embedding provider.
///
/// Implementations must be thread-safe (Send + Sync); the pipeline holds
/// one provider handle for its whole run.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts. The result is positionally aligned with
    /// `texts` and has the same length, or the whole call fails.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;
}
