//! `pdfqa search`

use anyhow::Result;
use comfy_table::Cell;
use serde::Serialize;

use super::load_indexer;
use crate::cli::output::{output, single_line, truncate, CommandOutput};
use crate::cli::progress::spinner;
use crate::cli::table::{list_table, render_list};
use crate::cli::types::SearchArgs;
use crate::domain::models::{Config, RetrievalResult};
use crate::services::Retriever;

/// Ranked excerpts for a query
#[derive(Debug, Serialize)]
pub struct SearchOutput {
    /// Document identity
    pub document: String,
    /// Query as given
    pub query: String,
    /// Excerpts, closest first
    pub results: Vec<RetrievalResult>,
    /// Print whole excerpts instead of a table
    #[serde(skip)]
    pub full: bool,
}

impl CommandOutput for SearchOutput {
    fn to_human(&self) -> String {
        if self.full {
            return Retriever::format_context(&self.results);
        }

        let mut table = list_table(&["#", "page", "section", "relevance", "excerpt"]);
        for (i, result) in self.results.iter().enumerate() {
            table.add_row(vec![
                Cell::new(i + 1),
                Cell::new(result.page),
                Cell::new(truncate(&result.section, 30)),
                Cell::new(format!("{:.2}", result.relevance())),
                Cell::new(truncate(&single_line(&result.content), 80)),
            ]);
        }
        render_list("excerpt", &table, self.results.len())
    }
}

pub async fn execute(args: SearchArgs, config: &Config, json: bool) -> Result<()> {
    let indexer = load_indexer(config, json).await?;

    let progress = spinner(format!("Processing {}", args.pdf.display()), json);
    let document = indexer.index_pdf(&args.pdf, None).await;
    progress.finish_and_clear();
    let document = document?;

    let retriever = Retriever::new(indexer.embedder().model().clone(), config.retrieval.max_top_k);
    let top_k = args.top_k.unwrap_or(config.retrieval.top_k);
    let results = retriever.retrieve(&args.query, &document, top_k).await;

    output(
        &SearchOutput {
            document: document.name,
            query: args.query,
            results,
            full: args.full,
        },
        json,
    );
    Ok(())
}
