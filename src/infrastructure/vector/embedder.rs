//! Batched, cached chunk embedding
//!
//! Wraps an [`EmbeddingService`] with fixed-size sequential batching and the
//! on-disk [`EmbeddingCache`]. Cache problems never fail a build: they are
//! logged and the vectors are recomputed.

use std::sync::Arc;

use anyhow::{bail, ensure, Context, Result};
use tracing::{debug, info, warn};

use super::embedding_cache::{CachedEmbeddings, EmbeddingCache};
use super::hash_model::HashEmbeddingModel;
use crate::domain::models::{Chunk, EmbeddingBackend, EmbeddingConfig};
use crate::domain::ports::EmbeddingService;

/// Build the embedding model selected by configuration
pub fn create_embedding_service(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingService>> {
    match config.backend {
        EmbeddingBackend::Hash => Ok(Arc::new(HashEmbeddingModel::new(config.dimension)?)),
        #[cfg(feature = "bert")]
        EmbeddingBackend::Bert => {
            let model = super::bert_model::BertEmbeddingModel::new(&config.model_id)?;
            Ok(Arc::new(Arc::new(model)))
        }
        #[cfg(not(feature = "bert"))]
        EmbeddingBackend::Bert => {
            bail!("embedding backend 'bert' requires the `bert` cargo feature; set embedding.backend to 'hash'")
        }
    }
}

/// Chunk embedder with batching and caching
pub struct Embedder {
    model: Arc<dyn EmbeddingService>,
    cache: Option<EmbeddingCache>,
    batch_size: usize,
}

impl Embedder {
    /// Create an embedder; `batch_size` must be positive
    pub fn new(model: Arc<dyn EmbeddingService>, batch_size: usize) -> Result<Self> {
        ensure!(batch_size > 0, "embedding batch size must be greater than 0");
        Ok(Self {
            model,
            cache: None,
            batch_size,
        })
    }

    /// Enable the on-disk cache
    #[must_use]
    pub fn with_cache(mut self, cache: EmbeddingCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn model(&self) -> &Arc<dyn EmbeddingService> {
        &self.model
    }

    pub fn model_id(&self) -> &str {
        self.model.model_id()
    }

    /// Vectors for `chunks`, in chunk order
    ///
    /// With a `cache_key` and a configured cache, a matching cache entry is
    /// returned as is and a freshly computed result is persisted.
    pub async fn embed_chunks(&self, chunks: &[Chunk], cache_key: Option<&str>) -> Result<Vec<Vec<f32>>> {
        let cache = self.cache.as_ref().zip(cache_key);

        if let Some((cache, key)) = cache {
            if let Some(vectors) = self.cached_vectors(cache, key, chunks.len()).await {
                info!(key, vectors = vectors.len(), "loaded embeddings from cache");
                return Ok(vectors);
            }
        }

        let vectors = self.compute(chunks).await?;

        if let Some((cache, key)) = cache {
            let entry = CachedEmbeddings {
                model_id: self.model.model_id().to_string(),
                dimension: self.model.dimensions(),
                vectors,
            };
            match cache.store(key, &entry).await {
                Ok(path) => debug!(path = %path.display(), "saved embeddings to cache"),
                Err(e) => warn!(key, error = %e, "failed to save embeddings to cache"),
            }
            return Ok(entry.vectors);
        }

        Ok(vectors)
    }

    async fn cached_vectors(&self, cache: &EmbeddingCache, key: &str, expected: usize) -> Option<Vec<Vec<f32>>> {
        let entry = match cache.load(key).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "failed to read embedding cache, recomputing");
                return None;
            }
        };

        if entry.model_id != self.model.model_id() {
            warn!(
                key,
                cached_model = %entry.model_id,
                model = %self.model.model_id(),
                "cached embeddings come from a different model, recomputing"
            );
            return None;
        }

        if entry.vectors.len() != expected {
            warn!(
                key,
                cached = entry.vectors.len(),
                chunks = expected,
                "cached embedding count does not match chunks, recomputing"
            );
            return None;
        }

        Some(entry.vectors)
    }

    async fn compute(&self, chunks: &[Chunk]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(chunks.len());

        for (batch, group) in chunks.chunks(self.batch_size).enumerate() {
            let texts: Vec<String> = group.iter().map(|c| c.content.clone()).collect();
            let embedded = self
                .model
                .embed_batch(&texts)
                .await
                .with_context(|| format!("Failed to embed batch {batch}"))?;

            if embedded.len() != texts.len() {
                bail!(
                    "Embedding model returned {} vectors for {} texts",
                    embedded.len(),
                    texts.len()
                );
            }

            debug!(batch, size = texts.len(), "embedded batch");
            vectors.extend(embedded);
        }

        Ok(vectors)
    }
}
