//! Persistent embedding cache store.
//!
//! A single JSON file mapping content digests to embedding vectors. The
//! full map is loaded once when the store is opened and rewritten to disk
//! on every insert, so an entry is durable by the time insert returns.
//!
//! The store assumes single-writer, single-process ownership for the
//! duration of a pipeline run; concurrent runs against the same file are
//! last-writer-wins over the whole map.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::CacheError;

/// Persistent digest -> embedding map.
pub struct EmbeddingCache {
    path: PathBuf,
    entries: HashMap<String, Vec<f32>>,
}

impl EmbeddingCache {
    /// Open the cache at `path`, loading any persisted entries.
    ///
    /// A missing file yields an empty cache. So does a file that cannot be
    /// read or parsed: the damage is logged and the pipeline proceeds as a
    /// full cache-miss run rather than failing.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path);
        debug!(path = ?path, entries = entries.len(), "Opened embedding cache");
        Self { path, entries }
    }

    /// Look up an embedding by content digest.
    pub fn get(&self, key: &str) -> Option<&[f32]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Whether an entry exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or overwrite an entry and persist the whole map.
    ///
    /// Write-through: the entry is durable on return. Rewriting the entire
    /// file is O(cache size) per insert, acceptable for moderate corpora.
    pub fn insert(&mut self, key: impl Into<String>, vector: Vec<f32>) -> Result<(), CacheError> {
        self.entries.insert(key.into(), vector);
        self.persist()
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec(&self.entries)?;
        fs::write(&self.path, bytes)?;
        Ok(())
    }
}

/// Load the persisted map, tolerating absence and corruption.
fn load_entries(path: &Path) -> HashMap<String, Vec<f32>> {
    if !path.exists() {
        return HashMap::new();
    }

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(path = ?path, error = %e, "Failed to read cache file, starting empty");
            return HashMap::new();
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = ?path, error = %e, "Cache file is not valid JSON, starting empty");
            HashMap::new()
        }
    }
}
