//! Parsed document domain models
//!
//! Output of PDF parsing: document-level metadata and per-page text with a
//! detected section label.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Title used when the PDF carries none
pub const DEFAULT_TITLE: &str = "Untitled";

/// Author used when the PDF carries none
pub const DEFAULT_AUTHOR: &str = "Unknown";

/// Document-level metadata extracted from the PDF info dictionary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Document title ("Untitled" when absent)
    pub title: String,

    /// Document author ("Unknown" when absent)
    pub author: String,

    /// Number of pages (0 for a document that failed to parse)
    pub pages: usize,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            author: DEFAULT_AUTHOR.to_string(),
            pages: 0,
        }
    }
}

/// Text of a single PDF page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    /// 1-based page number
    pub page: u32,

    /// Raw extracted text, possibly empty
    pub text: String,

    /// Detected section label, possibly empty
    pub section: String,
}

impl PageText {
    /// Create a page with the given text and section label
    pub fn new(page: u32, text: impl Into<String>, section: impl Into<String>) -> Self {
        Self {
            page,
            text: text.into(),
            section: section.into(),
        }
    }

    /// Placeholder for a page whose extraction failed
    pub fn placeholder(page: u32) -> Self {
        Self::new(page, format!("[Error processing page {page}]"), "")
    }

    /// True when the page has no non-whitespace text
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A parsed PDF: metadata plus pages ordered by page number
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// Document metadata
    pub metadata: DocumentMetadata,

    /// Page number → page text, iterated in page order
    pub pages: BTreeMap<u32, PageText>,
}

impl ParsedDocument {
    /// Build a document from metadata and pages
    pub fn new(metadata: DocumentMetadata, pages: impl IntoIterator<Item = PageText>) -> Self {
        let pages = pages.into_iter().map(|p| (p.page, p)).collect();
        Self { metadata, pages }
    }

    /// Degenerate single-page document describing a total parse failure
    pub fn failed(reason: &str) -> Self {
        Self::new(
            DocumentMetadata {
                title: "Error".to_string(),
                author: DEFAULT_AUTHOR.to_string(),
                pages: 0,
            },
            [PageText::new(1, format!("Failed to process PDF: {reason}"), "")],
        )
    }

    /// All page text concatenated in page order
    pub fn full_text(&self) -> String {
        self.pages
            .values()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
