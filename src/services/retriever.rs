//! Nearest-neighbour retrieval over a processed document

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::{debug, error, instrument, warn};

use super::prompts::NO_RESULTS_CONTEXT;
use crate::domain::models::{DocumentIndex, RetrievalResult};
use crate::domain::ports::EmbeddingService;

/// Embeds queries and looks them up in a [`DocumentIndex`]
///
/// Failures never surface as errors: they are logged and produce an empty
/// result set.
pub struct Retriever {
    model: Arc<dyn EmbeddingService>,
    max_top_k: usize,
}

impl Retriever {
    pub fn new(model: Arc<dyn EmbeddingService>, max_top_k: usize) -> Self {
        Self {
            model,
            max_top_k: max_top_k.max(1),
        }
    }

    /// Up to `k` results for `query`, closest first
    ///
    /// `k` is clamped to `1..=max_top_k`.
    #[instrument(skip(self, query, document), fields(document = %document.name))]
    pub async fn retrieve(&self, query: &str, document: &DocumentIndex, k: usize) -> Vec<RetrievalResult> {
        let k = k.clamp(1, self.max_top_k);

        if document.model_id != self.model.model_id() {
            error!(
                index_model = %document.model_id,
                query_model = %self.model.model_id(),
                "index was built with a different embedding model"
            );
            return Vec::new();
        }

        let embedding = match self.model.embed(query).await {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!(error = %e, "failed to embed query");
                return Vec::new();
            }
        };

        let hits = match document.index.search(&embedding, k) {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "index search failed");
                return Vec::new();
            }
        };

        let mut results: Vec<RetrievalResult> = hits
            .into_iter()
            .filter_map(|hit| {
                document
                    .chunks
                    .get(hit.position)
                    .map(|chunk| RetrievalResult::from_chunk(chunk, hit.distance))
            })
            .collect();
        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        debug!(results = results.len(), "retrieval complete");
        results
    }

    /// Render results as the context block handed to the model
    pub fn format_context(results: &[RetrievalResult]) -> String {
        if results.is_empty() {
            return NO_RESULTS_CONTEXT.to_string();
        }

        let mut context = String::from("CONTEXT FROM PDF DOCUMENT:\n\n");
        for (i, result) in results.iter().enumerate() {
            let _ = write!(context, "[EXCERPT {} - Page {}", i + 1, result.page);
            if result.has_section() {
                let _ = write!(context, ", Section: {}", result.section);
            }
            let _ = write!(
                context,
                ", Relevance: {:.2}]\n{}\n\n",
                result.relevance(),
                result.content
            );
        }
        context.push_str("END OF CONTEXT\n\n");
        context
    }
}
