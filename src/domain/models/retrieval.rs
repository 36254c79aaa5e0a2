//! Retrieval domain models
//!
//! A [`DocumentIndex`] is everything needed to answer queries against one
//! processed PDF; a [`RetrievalResult`] is one ranked excerpt.

use serde::{Deserialize, Serialize};

use super::chunking::Chunk;
use super::document::DocumentMetadata;
use crate::infrastructure::vector::FlatL2Index;

/// Section shown for excerpts whose page had no detected heading
pub const NO_SECTION: &str = "N/A";

/// One ranked excerpt returned by the retriever
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Chunk text
    pub content: String,

    /// Source page
    pub page: u32,

    /// Section label, `"N/A"` when the chunk has none
    pub section: String,

    /// Squared L2 distance to the query (lower is closer)
    pub distance: f32,

    /// Human-readable provenance, e.g. `"PDF Page 3, Section: 2.1: Methods"`
    pub source: String,
}

impl RetrievalResult {
    /// Build a result from a chunk and its distance
    pub fn from_chunk(chunk: &Chunk, distance: f32) -> Self {
        let section = if chunk.section.is_empty() {
            NO_SECTION.to_string()
        } else {
            chunk.section.clone()
        };

        let source = if section == NO_SECTION {
            format!("PDF Page {}", chunk.page)
        } else {
            format!("PDF Page {}, Section: {section}", chunk.page)
        };

        Self {
            content: chunk.content.clone(),
            page: chunk.page,
            section,
            distance,
            source,
        }
    }

    /// Heuristic relevance in `[0, 1]`: `1 - min(1, distance / 100)`
    pub fn relevance(&self) -> f32 {
        1.0 - (self.distance / 100.0).min(1.0)
    }

    /// True when a real section label is attached
    pub fn has_section(&self) -> bool {
        self.section != NO_SECTION
    }
}

/// A searchable, processed document
///
/// Row `i` of `index` is the embedding of `chunks[i]`.
#[derive(Debug, Clone)]
pub struct DocumentIndex {
    /// Sanitized document identity
    pub name: String,

    /// Vector index over all chunk embeddings
    pub index: FlatL2Index,

    /// Chunks aligned with index rows
    pub chunks: Vec<Chunk>,

    /// Metadata of the source PDF
    pub metadata: DocumentMetadata,

    /// Embedding model that produced the vectors
    pub model_id: String,
}

impl DocumentIndex {
    /// Number of indexed chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// True when nothing is indexed
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}
