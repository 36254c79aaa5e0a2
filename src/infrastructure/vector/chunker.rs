//! Sentence-aware text chunking
//!
//! Splits page text into overlapping chunks bounded by a word budget. Chunks
//! never straddle pages and never split a sentence.

use std::collections::VecDeque;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::domain::errors::ChunkingError;
use crate::domain::models::{Chunk, ChunkingConfig, PageText, ParsedDocument};

/// Whitespace after terminal punctuation and before a capital letter or digit.
/// Group 1 is the split point.
static SENTENCE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?](\s+)[A-Z0-9]").expect("valid sentence regex"));

/// Split text into sentences, dropping blank ones
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for caps in SENTENCE_BOUNDARY.captures_iter(text) {
        if let Some(gap) = caps.get(1) {
            sentences.push(&text[start..gap.start()]);
            start = gap.end();
        }
    }
    sentences.push(&text[start..]);

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Word-budget chunker with sentence overlap
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    /// Create a chunker with default configuration
    pub fn new() -> Self {
        Self {
            config: ChunkingConfig::default(),
        }
    }

    /// Create a chunker with custom configuration
    pub fn with_config(config: ChunkingConfig) -> Result<Self, ChunkingError> {
        config.validate().map_err(ChunkingError::InvalidConfig)?;
        Ok(Self { config })
    }

    pub const fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Chunk every page of a parsed document
    pub fn chunk_document(&self, document: &ParsedDocument) -> Vec<Chunk> {
        self.chunk_pages(document.pages.values())
    }

    /// Chunk pages in the order given
    ///
    /// The result is never empty: a document without usable text yields a
    /// single placeholder chunk.
    pub fn chunk_pages<'a>(&self, pages: impl IntoIterator<Item = &'a PageText>) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for page in pages {
            if page.is_blank() {
                continue;
            }
            let before = chunks.len();
            self.chunk_page(page, &mut chunks);
            debug!(page = page.page, chunks = chunks.len() - before, "chunked page");
        }

        if chunks.is_empty() {
            chunks.push(Chunk::placeholder());
        }

        chunks
    }

    fn chunk_page(&self, page: &PageText, out: &mut Vec<Chunk>) {
        let budget = self.config.chunk_size;
        let mut buffer: VecDeque<&str> = VecDeque::new();
        let mut words = 0;

        for sentence in split_sentences(&page.text) {
            let count = word_count(sentence);

            if words + count > budget && !buffer.is_empty() {
                out.push(Self::flush(&buffer, page));

                let keep = self.config.overlap.min(buffer.len());
                buffer.drain(..buffer.len() - keep);
                words = buffer.iter().map(|s| word_count(s)).sum();

                // Carried sentences give way to the incoming one
                while words + count > budget {
                    match buffer.pop_front() {
                        Some(dropped) => words -= word_count(dropped),
                        None => break,
                    }
                }
            }

            buffer.push_back(sentence);
            words += count;
        }

        if !buffer.is_empty() {
            out.push(Self::flush(&buffer, page));
        }
    }

    fn flush(buffer: &VecDeque<&str>, page: &PageText) -> Chunk {
        let content = buffer.iter().copied().collect::<Vec<_>>().join(" ");
        Chunk::new(content, page.page, page.section.clone())
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::PLACEHOLDER_CHUNK_CONTENT;

    fn chunker(chunk_size: usize, overlap: usize) -> Chunker {
        Chunker::with_config(ChunkingConfig::new(chunk_size, overlap)).unwrap()
    }

    #[test]
    fn test_split_sentences() {
        let sentences = split_sentences("Chapter 1: Intro. This explains X.  It uses Y.");
        assert_eq!(sentences, vec!["Chapter 1: Intro.", "This explains X.", "It uses Y."]);
    }

    #[test]
    fn test_split_requires_capital_or_digit() {
        let sentences = split_sentences("See e.g. the figure. 2 results follow! why not? Yes.");
        assert_eq!(
            sentences,
            vec!["See e.g. the figure.", "2 results follow! why not?", "Yes."]
        );
    }

    #[test]
    fn test_small_budget_scenario() {
        let pages = [
            PageText::new(1, "Chapter 1: Intro. This explains X. It uses Y.", "1: Intro"),
            PageText::new(2, "", ""),
        ];
        let chunks = chunker(5, 1).chunk_pages(&pages);

        let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["Chapter 1: Intro.", "This explains X.", "It uses Y."]);
        assert!(chunks.iter().all(|c| c.page == 1 && c.section == "1: Intro"));
    }

    #[test]
    fn test_overlap_carries_trailing_sentences() {
        let page = PageText::new(1, "One two. Three four. Five six. Seven eight.", "");
        let chunks = chunker(4, 1).chunk_pages([&page]);

        let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(
            contents,
            vec!["One two. Three four.", "Three four. Five six.", "Five six. Seven eight."]
        );
    }

    #[test]
    fn test_oversized_sentence_stands_alone() {
        let page = PageText::new(1, "Short one. This sentence has far too many words for it.", "");
        let chunks = chunker(3, 2).chunk_pages([&page]);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].content, "This sentence has far too many words for it.");
    }

    #[test]
    fn test_chunks_do_not_cross_pages() {
        let pages = [PageText::new(1, "Alpha beta.", "A"), PageText::new(2, "Gamma delta.", "B")];
        let chunks = chunker(100, 5).chunk_pages(&pages);
        assert_eq!(chunks.len(), 2);
        assert_eq!((chunks[0].page, chunks[0].section.as_str()), (1, "A"));
        assert_eq!((chunks[1].page, chunks[1].section.as_str()), (2, "B"));
    }

    #[test]
    fn test_blank_document_yields_placeholder() {
        let pages = [PageText::new(1, "   \n ", ""), PageText::new(2, "", "")];
        let chunks = chunker(10, 2).chunk_pages(&pages);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, PLACEHOLDER_CHUNK_CONTENT);
        assert_eq!(chunks[0].page, 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(Chunker::with_config(ChunkingConfig::new(0, 1)).is_err());
    }
}
