//! # corpus-types
//!
//! Shared domain types for the corpus-embed pipeline.
//!
//! This crate defines the data structures that flow through the pipeline:
//! - Documents: immutable input units of text
//! - Embedded nodes: documents paired with their validated embedding
//! - Settings: layered configuration for cache, provider, and retry behavior

pub mod config;
pub mod document;
pub mod error;

pub use config::{ProviderSettings, RetrySettings, Settings};
pub use document::{Document, EmbeddedNode};
pub use error::CorpusError;
