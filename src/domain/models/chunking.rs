//! Text chunking domain models
//!
//! Models for splitting page text into overlapping retrieval units.
//! Chunk size is a word budget; overlap is counted in sentences.

use serde::{Deserialize, Serialize};

/// Content of the single chunk emitted when a document yields no text
pub const PLACEHOLDER_CHUNK_CONTENT: &str = "No processable text found in document.";

/// Configuration for document chunking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ChunkingConfig {
    /// Maximum words per chunk (a single oversized sentence may exceed it)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Number of trailing sentences carried into the next chunk
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

const fn default_chunk_size() -> usize {
    900
}

const fn default_overlap() -> usize {
    40
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
        }
    }
}

impl ChunkingConfig {
    /// Create a configuration with explicit sizes
    pub const fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size,
            overlap,
        }
    }

    /// Validate the chunking configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// A retrieval unit cut from one page
///
/// A chunk's position in the document's chunk sequence is its row in the
/// vector index; the chunk itself does not store it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Sentences joined by single spaces (never empty)
    pub content: String,

    /// Source page number (1-based)
    pub page: u32,

    /// Section label inherited from the page, possibly empty
    pub section: String,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(content: impl Into<String>, page: u32, section: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            page,
            section: section.into(),
        }
    }

    /// Chunk substituted when a document produces no text at all
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_CHUNK_CONTENT, 1, "")
    }

    /// Number of whitespace-separated words in the content
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    /// Get a preview of the content (first 100 chars)
    pub fn preview(&self) -> String {
        if self.content.chars().count() <= 100 {
            self.content.clone()
        } else {
            let head: String = self.content.chars().take(100).collect();
            format!("{head}...")
        }
    }
}
