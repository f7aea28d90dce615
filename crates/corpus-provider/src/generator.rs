//! Chunked batch embedding generation with graceful degradation.
//!
//! Failure handling is layered: a chunk's batch call is retried under the
//! policy, and only after retries are exhausted does the generator fall
//! back to one single-item call per text in that chunk. An item whose
//! individual call also fails yields an absence marker at its position —
//! one bad input never aborts the whole run.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{EmbeddingProvider, ProviderError, RetryPolicy};

/// Resilient batch embedding generator.
pub struct BatchEmbeddingGenerator {
    provider: Arc<dyn EmbeddingProvider>,
    retry: RetryPolicy,
}

impl BatchEmbeddingGenerator {
    /// Create a generator over an explicit provider handle.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, retry: RetryPolicy) -> Self {
        Self { provider, retry }
    }

    /// Generate embeddings for `texts` in chunks of at most `chunk_size`.
    ///
    /// The result is positionally aligned with `texts` and always has the
    /// same length, regardless of how many chunks fail. `None` marks an
    /// item whose embedding could not be generated after batch retries and
    /// the per-item fallback.
    pub async fn generate(&self, texts: &[String], chunk_size: usize) -> Vec<Option<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        if texts.is_empty() {
            return results;
        }

        let chunk_size = chunk_size.max(1);

        for chunk in texts.chunks(chunk_size) {
            match self.embed_chunk(chunk).await {
                Ok(vectors) => {
                    debug!(chunk_len = chunk.len(), "Chunk embedded in one batch call");
                    results.extend(vectors.into_iter().map(Some));
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        chunk_len = chunk.len(),
                        "Batch embedding failed, falling back to per-item calls"
                    );
                    results.extend(self.embed_items(chunk).await);
                }
            }
        }

        results
    }

    /// Embed one chunk with the batch operation under the retry policy.
    async fn embed_chunk(&self, chunk: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        let vectors = self.retry.run(|| self.provider.embed_batch(chunk)).await?;

        if vectors.len() != chunk.len() {
            return Err(ProviderError::Parse(format!(
                "expected {} embeddings, got {}",
                chunk.len(),
                vectors.len()
            )));
        }

        Ok(vectors)
    }

    /// Per-item fallback: one single-attempt call per text.
    async fn embed_items(&self, chunk: &[String]) -> Vec<Option<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(chunk.len());

        for text in chunk {
            match self.provider.embed(text).await {
                Ok(vector) => vectors.push(Some(vector)),
                Err(e) => {
                    warn!(error = %e, "Individual embedding failed");
                    vectors.push(None);
                }
            }
        }

        vectors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockProvider;
    use std::time::Duration;

    fn fast_retry() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(4))
    }

    fn texts(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("document text {}", i)).collect()
    }

    #[tokio::test]
    async fn test_result_length_matches_input() {
        let provider = Arc::new(MockProvider::new(8));
        let generator = BatchEmbeddingGenerator::new(provider, fast_retry());

        let input = texts(7);
        let results = generator.generate(&input, 3).await;
        assert_eq!(results.len(), 7);
        assert!(results.iter().all(|r| r.is_some()));
    }

    #[tokio::test]
    async fn test_chunking_issues_one_call_per_chunk() {
        let provider = Arc::new(MockProvider::new(8));
        let generator = BatchEmbeddingGenerator::new(provider.clone(), fast_retry());

        let input = texts(7);
        generator.generate(&input, 3).await;
        // 7 texts in chunks of 3 -> 3 batch calls, no fallback.
        assert_eq!(provider.batch_calls(), 3);
        assert_eq!(provider.item_calls(), 0);
    }

    #[tokio::test]
    async fn test_transient_batch_failure_is_retried_without_fallback() {
        let provider = Arc::new(MockProvider::new(8).with_batch_failures(1));
        let generator = BatchEmbeddingGenerator::new(provider.clone(), fast_retry());

        let input = texts(3);
        let results = generator.generate(&input, 50).await;

        assert!(results.iter().all(|r| r.is_some()));
        assert_eq!(provider.batch_calls(), 2);
        assert_eq!(provider.item_calls(), 0);
    }

    #[tokio::test]
    async fn test_exhausted_retries_fall_back_per_item() {
        let provider = Arc::new(MockProvider::new(8).with_batch_failures(3));
        let generator = BatchEmbeddingGenerator::new(provider.clone(), fast_retry());

        let input = texts(3);
        let results = generator.generate(&input, 50).await;

        assert_eq!(provider.batch_calls(), 3);
        assert_eq!(provider.item_calls(), 3);
        assert!(results.iter().all(|r| r.is_some()));
    }

    #[tokio::test]
    async fn test_item_failures_degrade_to_none() {
        let provider = Arc::new(
            MockProvider::new(8)
                .with_batch_failures(3)
                .with_failing_item("document text 1"),
        );
        let generator = BatchEmbeddingGenerator::new(provider.clone(), fast_retry());

        let input = texts(3);
        let results = generator.generate(&input, 50).await;

        assert_eq!(results.len(), 3);
        assert!(results[0].is_some());
        assert!(results[1].is_none());
        assert!(results[2].is_some());
    }

    #[tokio::test]
    async fn test_failing_chunk_does_not_affect_others() {
        // Only the first chunk's batch calls fail; its items still succeed
        // individually, and the second chunk is batched normally.
        let provider = Arc::new(MockProvider::new(8).with_batch_failures(3));
        let generator = BatchEmbeddingGenerator::new(provider.clone(), fast_retry());

        let input = texts(4);
        let results = generator.generate(&input, 2).await;

        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r.is_some()));
        // Chunk 1: 3 failed batch attempts + 2 item calls. Chunk 2: 1 batch call.
        assert_eq!(provider.batch_calls(), 4);
        assert_eq!(provider.item_calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_input_issues_no_calls() {
        let provider = Arc::new(MockProvider::new(8));
        let generator = BatchEmbeddingGenerator::new(provider.clone(), fast_retry());

        let results = generator.generate(&[], 50).await;
        assert!(results.is_empty());
        assert_eq!(provider.batch_calls(), 0);
    }
}
