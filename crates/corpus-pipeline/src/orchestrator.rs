//! Embedding pipeline orchestration.
//!
//! Two passes over the input: a partition pass that resolves documents
//! against the cache, and a generation pass that embeds the misses in
//! chunks. Validation happens strictly before any cache write — an
//! invalid vector is never persisted and never becomes a node.

use tracing::{info, warn};

use corpus_cache::{content_hash, EmbeddingCache};
use corpus_provider::BatchEmbeddingGenerator;
use corpus_types::{Document, EmbeddedNode, Settings};

use crate::error::PipelineError;

/// Pipeline tuning knobs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Chunk size for provider batch calls during generation. Tuned below
    /// the provider default for stability under provider limits.
    pub chunk_size: usize,

    /// Expected embedding dimension; vectors of any other length are
    /// discarded, never persisted or returned.
    pub dimension: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: 50,
            dimension: 1536,
        }
    }
}

impl PipelineConfig {
    /// Build pipeline config from loaded settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            chunk_size: settings.pipeline_chunk_size,
            dimension: settings.dimension,
        }
    }
}

/// Counters for one pipeline run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PipelineStats {
    /// Nodes served from the cache
    pub cached: usize,
    /// Nodes freshly generated and cached
    pub generated: usize,
    /// Documents dropped for missing or invalid embeddings
    pub dropped: usize,
}

/// Cache-aware embedding pipeline.
///
/// Owns the cache for the duration of a run and holds one provider-backed
/// generator, constructed explicitly at pipeline start.
pub struct EmbeddingPipeline {
    generator: BatchEmbeddingGenerator,
    cache: EmbeddingCache,
    config: PipelineConfig,
}

impl EmbeddingPipeline {
    /// Create a new pipeline.
    pub fn new(
        generator: BatchEmbeddingGenerator,
        cache: EmbeddingCache,
        config: PipelineConfig,
    ) -> Self {
        Self {
            generator,
            cache,
            config,
        }
    }

    /// Run the pipeline over `documents`.
    ///
    /// Returns one node per document whose embedding was found in the
    /// cache or successfully generated and validated. Output order is
    /// cached-first / generated-second, not the input order; relative
    /// order is preserved within each group.
    ///
    /// Fails only when the cache cannot be persisted or when zero
    /// documents end up with a usable embedding.
    pub async fn run(&mut self, documents: &[Document]) -> Result<Vec<EmbeddedNode>, PipelineError> {
        let mut nodes = Vec::with_capacity(documents.len());
        let mut pending: Vec<(&Document, String)> = Vec::new();
        let mut stats = PipelineStats::default();

        // Partition pass: resolve each document against the cache.
        for doc in documents {
            let key = content_hash(&doc.text);
            match self.cache.get(&key) {
                Some(vector) => {
                    nodes.push(EmbeddedNode::new(
                        doc.id.clone(),
                        doc.text.clone(),
                        vector.to_vec(),
                    ));
                    stats.cached += 1;
                }
                None => pending.push((doc, key)),
            }
        }

        info!(
            cached = stats.cached,
            pending = pending.len(),
            "Partitioned documents against embedding cache"
        );

        // Generation pass: embed the misses, validate, write through.
        if !pending.is_empty() {
            let texts: Vec<String> = pending.iter().map(|(doc, _)| doc.text.clone()).collect();
            let results = self.generator.generate(&texts, self.config.chunk_size).await;

            for ((doc, key), result) in pending.into_iter().zip(results) {
                match result {
                    Some(vector) if vector.len() == self.config.dimension => {
                        self.cache.insert(key, vector.clone())?;
                        nodes.push(EmbeddedNode::new(doc.id.clone(), doc.text.clone(), vector));
                        stats.generated += 1;
                    }
                    Some(vector) => {
                        warn!(
                            document = %doc.id,
                            expected = self.config.dimension,
                            actual = vector.len(),
                            "Discarding embedding with unexpected dimension"
                        );
                        stats.dropped += 1;
                    }
                    None => {
                        warn!(document = %doc.id, "No embedding generated for document");
                        stats.dropped += 1;
                    }
                }
            }
        }

        info!(
            cached = stats.cached,
            generated = stats.generated,
            dropped = stats.dropped,
            total = nodes.len(),
            "Embedding pipeline complete"
        );

        if nodes.is_empty() {
            return Err(PipelineError::NoValidNodes);
        }

        Ok(nodes)
    }

    /// The cache owned by this pipeline.
    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }
}
