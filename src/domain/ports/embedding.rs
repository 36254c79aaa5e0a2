//! Embedding service port for semantic vector generation.
//!
//! Defines the trait for embedding models that convert text into
//! dense vector representations for similarity search.

use anyhow::Result;
use async_trait::async_trait;

/// Trait for text embedding models.
///
/// Every vector returned by one implementation has length [`dimensions`].
/// The [`model_id`] identifies the embedding space: vectors from different
/// ids must never be compared.
///
/// [`dimensions`]: EmbeddingService::dimensions
/// [`model_id`]: EmbeddingService::model_id
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for several texts, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embedding dimension for this model.
    fn dimensions(&self) -> usize;

    /// Model identifier (e.g., "BAAI/bge-base-en-v1.5").
    fn model_id(&self) -> &str;
}
