//! Document and node types.
//!
//! Documents are the immutable input unit supplied by the document source.
//! Embedded nodes pair a document with its validated embedding vector and
//! are what the downstream index builder consumes.

use serde::{Deserialize, Serialize};

/// A text document to be embedded.
///
/// The id identifies the source (typically a file path or reader-assigned
/// id); the text is assumed to be non-empty, filtered upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Source identifier
    pub id: String,

    /// Document text content
    pub text: String,
}

impl Document {
    /// Create a new document.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// A document paired with its embedding vector.
///
/// Only constructed from valid embeddings; a node never carries a vector
/// whose length differs from the configured dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedNode {
    /// Source document id
    pub id: String,

    /// Document text content
    pub text: String,

    /// Embedding vector
    pub embedding: Vec<f32>,
}

impl EmbeddedNode {
    /// Create a new node from a document's parts and its embedding.
    pub fn new(id: impl Into<String>, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            embedding,
        }
    }

    /// Embedding dimension of this node.
    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }

    /// Serialize node to JSON bytes for handoff to the index builder.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize node from JSON bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_serialization_roundtrip() {
        let node = EmbeddedNode::new("doc-1", "some text", vec![0.1, 0.2, 0.3]);

        let bytes = node.to_bytes().unwrap();
        let decoded = EmbeddedNode::from_bytes(&bytes).unwrap();

        assert_eq!(node.id, decoded.id);
        assert_eq!(node.text, decoded.text);
        assert_eq!(node.embedding, decoded.embedding);
    }

    #[test]
    fn test_node_dimension() {
        let node = EmbeddedNode::new("doc-1", "some text", vec![0.0; 1536]);
        assert_eq!(node.dimension(), 1536);
    }

    #[test]
    fn test_document_construction() {
        let doc = Document::new("data/notes.txt", "contents");
        assert_eq!(doc.id, "data/notes.txt");
        assert_eq!(doc.text, "contents");
    }
}
