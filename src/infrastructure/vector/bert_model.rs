//! BERT sentence-embedding model
//!
//! Runs a BERT-family sentence-transformer on CPU with candle. Weights,
//! config and tokenizer are fetched from the Hugging Face Hub and cached in
//! `~/.cache/huggingface/hub/`.

use std::sync::Arc;

use anyhow::{anyhow, ensure, Context, Result};
use async_trait::async_trait;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use serde::Deserialize;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};
use tracing::info;

use crate::domain::ports::EmbeddingService;

/// The handful of `config.json` fields needed outside candle
#[derive(Debug, Deserialize)]
struct ModelShape {
    hidden_size: usize,
    max_position_embeddings: usize,
}

/// BERT embedding model with mean pooling and L2 normalization
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use pdfqa::domain::ports::EmbeddingService;
/// use pdfqa::infrastructure::vector::BertEmbeddingModel;
///
/// # async fn example() -> anyhow::Result<()> {
/// let model = Arc::new(BertEmbeddingModel::new("BAAI/bge-base-en-v1.5")?);
/// let embedding = model.embed("What is photosynthesis?").await?;
/// assert_eq!(embedding.len(), 768);
/// # Ok(())
/// # }
/// ```
pub struct BertEmbeddingModel {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    model_id: String,
    dimensions: usize,
}

impl BertEmbeddingModel {
    /// Download (if needed) and load a model from the Hub
    pub fn new(model_id: &str) -> Result<Self> {
        let device = Device::Cpu;
        info!(model_id, "loading embedding model");

        let api = hf_hub::api::sync::Api::new().context("Failed to initialize HuggingFace API")?;
        let repo = api.model(model_id.to_string());

        let config_path = repo
            .get("config.json")
            .context("Failed to download config.json from HuggingFace")?;
        let config_json = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: Config =
            serde_json::from_str(&config_json).context("Failed to parse config.json")?;
        let shape: ModelShape =
            serde_json::from_str(&config_json).context("Failed to parse config.json")?;

        let tokenizer_path = repo
            .get("tokenizer.json")
            .context("Failed to download tokenizer.json from HuggingFace")?;
        let mut tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            anyhow!("Failed to load tokenizer from {}: {e}", tokenizer_path.display())
        })?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        }));
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: shape.max_position_embeddings,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("Failed to configure truncation: {e}"))?;

        let weights_path = repo
            .get("model.safetensors")
            .context("Failed to download model.safetensors from HuggingFace")?;
        let weights = std::fs::read(&weights_path)
            .with_context(|| format!("Failed to read {}", weights_path.display()))?;
        let vb = VarBuilder::from_buffered_safetensors(weights, DType::F32, &device)
            .context("Failed to load model weights from safetensors")?;
        let model = BertModel::load(vb, &config).context("Failed to create BERT model")?;

        info!(model_id, dimensions = shape.hidden_size, "embedding model ready");

        Ok(Self {
            model,
            tokenizer,
            device,
            model_id: model_id.to_string(),
            dimensions: shape.hidden_size,
        })
    }

    /// Tokenize, encode, mean-pool and normalize one batch (CPU-bound)
    fn embed_batch_sync(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow!("Failed to tokenize texts: {e}"))?;

        let batch_size = encodings.len();
        let seq_len = encodings.first().map_or(0, |e| e.get_ids().len());
        ensure!(seq_len > 0, "Tokenizer produced empty sequences");

        let ids: Vec<u32> = encodings.iter().flat_map(|e| e.get_ids().to_vec()).collect();
        let mask: Vec<u32> = encodings
            .iter()
            .flat_map(|e| e.get_attention_mask().to_vec())
            .collect();

        let input_ids = Tensor::from_vec(ids, (batch_size, seq_len), &self.device)?;
        let attention_mask = Tensor::from_vec(mask, (batch_size, seq_len), &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))
            .context("BERT forward pass failed")?;

        let pooled = mean_pool(&hidden, &attention_mask).context("Mean pooling failed")?;
        let normalized = normalize_l2(&pooled).context("L2 normalization failed")?;

        Ok(normalized.to_vec2::<f32>()?)
    }
}

/// Average token states over real (unpadded) tokens
fn mean_pool(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    // hidden: (batch, seq, hidden); mask: (batch, seq)
    let mask = attention_mask.to_dtype(DType::F32)?.unsqueeze(2)?;
    let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
    let counts = mask.sum(1)?.clamp(1e-9_f32, f32::MAX)?;
    Ok(summed.broadcast_div(&counts)?)
}

fn normalize_l2(embeddings: &Tensor) -> Result<Tensor> {
    let norms = embeddings
        .sqr()?
        .sum_keepdim(1)?
        .sqrt()?
        .clamp(1e-12_f32, f32::MAX)?;
    Ok(embeddings.broadcast_div(&norms)?)
}

#[async_trait]
impl EmbeddingService for Arc<BertEmbeddingModel> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let texts = vec![text.to_string()];
        let model = Arc::clone(self);

        tokio::task::spawn_blocking(move || {
            model
                .embed_batch_sync(&texts)?
                .into_iter()
                .next()
                .ok_or_else(|| anyhow!("Expected 1 embedding, got 0"))
        })
        .await
        .context("Tokio task join error")?
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let texts = texts.to_vec();
        let model = Arc::clone(self);

        tokio::task::spawn_blocking(move || model.embed_batch_sync(&texts))
            .await
            .context("Tokio task join error")?
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
