//! CLI command implementations.

pub mod chat;
pub mod config;
pub mod index;
pub mod models;
pub mod search;

use anyhow::{Context, Result};

use crate::cli::progress::spinner;
use crate::domain::models::Config;
use crate::services::DocumentIndexer;

/// Build the indexing pipeline, loading the embedding model off the async runtime
pub(crate) async fn load_indexer(config: &Config, json: bool) -> Result<DocumentIndexer> {
    let progress = spinner(
        format!("Loading embedding model {}", config.embedding.model_id),
        json,
    );
    let config = config.clone();
    let indexer = tokio::task::spawn_blocking(move || DocumentIndexer::from_config(&config))
        .await
        .context("Embedding model loader task failed")?;
    progress.finish_and_clear();
    indexer
}
