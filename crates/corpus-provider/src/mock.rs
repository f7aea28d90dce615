//! Mock embedding provider for testing.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::{EmbeddingProvider, ProviderError};

/// Mock provider that derives deterministic vectors from text.
///
/// Failure behavior is programmable: the first N batch calls can fail,
/// specific texts can fail their single-item call, and specific texts can
/// embed at the wrong dimension. Call counters expose how many batch and
/// item operations were issued.
pub struct MockProvider {
    dimension: usize,
    batch_failures: AtomicUsize,
    fail_items: HashSet<String>,
    wrong_dimension_items: HashSet<String>,
    batch_calls: AtomicUsize,
    item_calls: AtomicUsize,
}

impl MockProvider {
    /// Create a mock provider producing vectors of `dimension`.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            batch_failures: AtomicUsize::new(0),
            fail_items: HashSet::new(),
            wrong_dimension_items: HashSet::new(),
            batch_calls: AtomicUsize::new(0),
            item_calls: AtomicUsize::new(0),
        }
    }

    /// Fail the first `n` batch calls with a transient API error.
    pub fn with_batch_failures(self, n: usize) -> Self {
        self.batch_failures.store(n, Ordering::SeqCst);
        self
    }

    /// Fail every single-item call for `text`.
    pub fn with_failing_item(mut self, text: impl Into<String>) -> Self {
        self.fail_items.insert(text.into());
        self
    }

    /// Produce a wrong-dimension vector for `text`.
    pub fn with_wrong_dimension_item(mut self, text: impl Into<String>) -> Self {
        self.wrong_dimension_items.insert(text.into());
        self
    }

    /// Number of batch calls issued so far.
    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    /// Number of single-item calls issued so far.
    pub fn item_calls(&self) -> usize {
        self.item_calls.load(Ordering::SeqCst)
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let dimension = if self.wrong_dimension_items.contains(text) {
            self.dimension / 2 + 1
        } else {
            self.dimension
        };

        // Cheap deterministic fill seeded from the text bytes.
        let seed = text
            .bytes()
            .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
        (0..dimension)
            .map(|i| (seed.wrapping_add(i as u32) % 1000) as f32 / 1000.0)
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for MockProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);

        let remaining = self.batch_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.batch_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(ProviderError::Api("simulated batch failure".to_string()));
        }

        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        self.item_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_items.contains(text) {
            return Err(ProviderError::Api("simulated item failure".to_string()));
        }

        Ok(self.vector_for(text))
    }
}
