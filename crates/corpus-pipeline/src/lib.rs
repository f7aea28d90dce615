//! # corpus-pipeline
//!
//! Cache-aware embedding pipeline orchestration.
//!
//! The pipeline partitions documents into cache hits and misses, generates
//! embeddings only for the misses, validates every generated vector
//! against the configured dimension before it is persisted or returned,
//! and assembles the final node list for the downstream index builder.

pub mod error;
pub mod orchestrator;

pub use error::PipelineError;
pub use orchestrator::{EmbeddingPipeline, PipelineConfig, PipelineStats};
