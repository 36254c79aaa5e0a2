//! Feature-hashing embedding model
//!
//! Maps lowercase word tokens into a fixed number of buckets with FNV-1a and
//! L2-normalizes the counts. Needs no model download, so it backs offline
//! runs and tests. Texts sharing vocabulary land close together.

use anyhow::{ensure, Result};
use async_trait::async_trait;

use crate::domain::ports::EmbeddingService;

/// Model identifier reported by [`HashEmbeddingModel`]
pub const HASH_MODEL_ID: &str = "feature-hash-v1";

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

fn fnv1a(token: &str) -> u64 {
    token.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Deterministic bag-of-words embedding
#[derive(Debug, Clone)]
pub struct HashEmbeddingModel {
    dimensions: usize,
    model_id: String,
}

impl HashEmbeddingModel {
    /// Create a model producing `dimensions`-long vectors
    pub fn new(dimensions: usize) -> Result<Self> {
        ensure!(dimensions > 0, "embedding dimension must be greater than 0");
        Ok(Self {
            dimensions,
            model_id: format!("{HASH_MODEL_ID}-{dimensions}"),
        })
    }

    /// Embed one text synchronously
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0_f32; self.dimensions];

        let tokens = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);

        for token in tokens {
            let hash = fnv1a(&token);
            #[allow(clippy::cast_possible_truncation)]
            let bucket = (hash % self.dimensions as u64) as usize;
            // The top bit picks a sign so unrelated tokens tend to cancel
            if hash >> 63 == 0 {
                embedding[bucket] += 1.0;
            } else {
                embedding[bucket] -= 1.0;
            }
        }

        let norm = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 1e-10 {
            for value in &mut embedding {
                *value /= norm;
            }
        }

        embedding
    }
}

#[async_trait]
impl EmbeddingService for HashEmbeddingModel {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::vector::squared_l2;

    #[tokio::test]
    async fn test_embed_dimensions() {
        let model = HashEmbeddingModel::new(64).unwrap();
        let embedding = model.embed("Hello world").await.unwrap();
        assert_eq!(embedding.len(), 64);
        assert_eq!(model.model_id(), "feature-hash-v1-64");
    }

    #[tokio::test]
    async fn test_embed_batch_keeps_order() {
        let model = HashEmbeddingModel::new(32).unwrap();
        let texts = vec!["alpha".to_string(), "beta".to_string()];
        let batch = model.embed_batch(&texts).await.unwrap();
        assert_eq!(batch[0], model.embed_text("alpha"));
        assert_eq!(batch[1], model.embed_text("beta"));
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        let model = HashEmbeddingModel::new(128).unwrap();
        assert_eq!(model.embed_text("Photosynthesis!"), model.embed_text("photosynthesis"));
    }

    #[test]
    fn test_shared_vocabulary_is_closer() {
        let model = HashEmbeddingModel::new(256).unwrap();
        let query = model.embed_text("chlorophyll absorbs light");
        let related = model.embed_text("Chlorophyll absorbs red and blue light.");
        let unrelated = model.embed_text("The treaty was signed in 1648.");
        assert!(squared_l2(&query, &related) < squared_l2(&query, &unrelated));
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let model = HashEmbeddingModel::new(8).unwrap();
        assert!(model.embed_text("  ").iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(HashEmbeddingModel::new(0).is_err());
    }
}
