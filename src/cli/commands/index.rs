//! `pdfqa index`

use anyhow::Result;
use serde::Serialize;

use super::load_indexer;
use crate::cli::output::{output, CommandOutput};
use crate::cli::progress::spinner;
use crate::cli::types::IndexArgs;
use crate::domain::models::{Config, DocumentIndex};

/// Summary of an indexed PDF
#[derive(Debug, Serialize)]
pub struct IndexOutput {
    /// Document identity
    pub name: String,
    /// Title from the PDF metadata
    pub title: String,
    /// Author from the PDF metadata
    pub author: String,
    /// Page count
    pub pages: usize,
    /// Number of chunks indexed
    pub chunks: usize,
    /// Embedding model the index was built with
    pub model_id: String,
    /// Vector dimension
    pub dimension: usize,
}

impl From<&DocumentIndex> for IndexOutput {
    fn from(document: &DocumentIndex) -> Self {
        Self {
            name: document.name.clone(),
            title: document.metadata.title.clone(),
            author: document.metadata.author.clone(),
            pages: document.metadata.pages,
            chunks: document.chunks.len(),
            model_id: document.model_id.clone(),
            dimension: document.index.dimension(),
        }
    }
}

impl CommandOutput for IndexOutput {
    fn to_human(&self) -> String {
        [
            format!("Indexed document: {}", self.name),
            format!("  Title:     {}", self.title),
            format!("  Author:    {}", self.author),
            format!("  Pages:     {}", self.pages),
            format!("  Chunks:    {}", self.chunks),
            format!("  Model:     {} ({} dimensions)", self.model_id, self.dimension),
        ]
        .join("\n")
    }
}

pub async fn execute(args: IndexArgs, config: &Config, json: bool) -> Result<()> {
    let indexer = load_indexer(config, json).await?;

    let progress = spinner(format!("Processing {}", args.pdf.display()), json);
    let document = indexer.index_pdf(&args.pdf, args.name.as_deref()).await;
    progress.finish_and_clear();

    output(&IndexOutput::from(&document?), json);
    Ok(())
}
