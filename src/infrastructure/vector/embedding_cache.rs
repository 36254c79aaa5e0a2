//! On-disk embedding cache
//!
//! One JSON file per document at `<dir>/<key>_embeddings.json`, read and
//! written whole.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from reading or writing a cache file
#[derive(Debug, Error)]
pub enum EmbeddingCacheError {
    #[error("Cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed cache file {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Serialized cache entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedEmbeddings {
    /// Model that produced the vectors
    pub model_id: String,

    /// Length of every vector
    pub dimension: usize,

    /// One vector per chunk, in chunk order
    pub vectors: Vec<Vec<f32>>,
}

/// Directory-backed embedding cache
#[derive(Debug, Clone)]
pub struct EmbeddingCache {
    dir: PathBuf,
}

impl EmbeddingCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the entry for `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}_embeddings.json"))
    }

    /// Load the entry for `key`; `Ok(None)` when no file exists
    pub async fn load(&self, key: &str) -> Result<Option<CachedEmbeddings>, EmbeddingCacheError> {
        let path = self.path_for(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(EmbeddingCacheError::Io { path, source }),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| EmbeddingCacheError::Format { path, source })
    }

    /// Write the entry for `key`, creating the directory if needed
    pub async fn store(
        &self,
        key: &str,
        entry: &CachedEmbeddings,
    ) -> Result<PathBuf, EmbeddingCacheError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| EmbeddingCacheError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let path = self.path_for(key);
        let json = serde_json::to_vec(entry).map_err(|source| EmbeddingCacheError::Format {
            path: path.clone(),
            source,
        })?;

        tokio::fs::write(&path, json)
            .await
            .map_err(|source| EmbeddingCacheError::Io {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }
}
