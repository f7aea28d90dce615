//! # corpus-cache
//!
//! Content-addressed persistent embedding cache.
//!
//! Documents are keyed by a digest of their text, so two documents with
//! identical content share one cache entry and re-runs of the pipeline
//! skip the provider entirely for already-embedded content.
//!
//! The store is a single JSON file rewritten on every insert
//! (write-through). A missing or corrupt file loads as an empty cache —
//! cache damage must never block the pipeline.

pub mod error;
pub mod hasher;
pub mod store;

pub use error::CacheError;
pub use hasher::content_hash;
pub use store::EmbeddingCache;
