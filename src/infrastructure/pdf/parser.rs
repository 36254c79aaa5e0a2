//! PDF text extraction
//!
//! Extraction never fails from the caller's point of view: a bad page becomes
//! a placeholder page and an unreadable file becomes a one-page error
//! document.

use std::path::Path;

use lopdf::{Dictionary, Document, Object};
use tracing::{debug, error, info, warn};

use super::sections::detect_section;
use crate::domain::models::{
    DocumentMetadata, PageText, ParsedDocument, DEFAULT_AUTHOR, DEFAULT_TITLE,
};

/// PDF parser built on lopdf
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfParser;

impl PdfParser {
    pub const fn new() -> Self {
        Self
    }

    /// Parse the PDF at `path`
    ///
    /// This is blocking; call it from `spawn_blocking` in async code.
    pub fn parse(&self, path: impl AsRef<Path>) -> ParsedDocument {
        let path = path.as_ref();

        let document = match Document::load(path) {
            Ok(document) => document,
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to parse PDF");
                return ParsedDocument::failed(&e.to_string());
            }
        };

        let parsed = Self::parse_document(&document);
        info!(
            path = %path.display(),
            pages = parsed.metadata.pages,
            title = %parsed.metadata.title,
            "parsed PDF"
        );
        parsed
    }

    /// Parse PDF bytes already in memory
    pub fn parse_bytes(&self, bytes: &[u8]) -> ParsedDocument {
        match Document::load_mem(bytes) {
            Ok(document) => Self::parse_document(&document),
            Err(e) => {
                error!(error = %e, "failed to parse PDF");
                ParsedDocument::failed(&e.to_string())
            }
        }
    }

    fn parse_document(document: &Document) -> ParsedDocument {
        let page_ids = document.get_pages();
        let info = info_dictionary(document);

        let metadata = DocumentMetadata {
            title: info
                .and_then(|d| text_entry(d, b"Title"))
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            author: info
                .and_then(|d| text_entry(d, b"Author"))
                .unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            pages: page_ids.len(),
        };

        let pages = page_ids.keys().map(|&page| match document.extract_text(&[page]) {
            Ok(text) => {
                let section = detect_section(&text);
                debug!(page, chars = text.len(), section = %section, "extracted page");
                PageText::new(page, text, section)
            }
            Err(e) => {
                warn!(page, error = %e, "failed to extract page text");
                PageText::placeholder(page)
            }
        });

        ParsedDocument::new(metadata, pages.collect::<Vec<_>>())
    }
}

/// The trailer's `/Info` dictionary, direct or referenced
fn info_dictionary(document: &Document) -> Option<&Dictionary> {
    match document.trailer.get(b"Info").ok()? {
        Object::Reference(id) => document.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

/// A non-empty text string entry of an info dictionary
fn text_entry(dict: &Dictionary, key: &[u8]) -> Option<String> {
    let Object::String(bytes, _) = dict.get(key).ok()? else {
        return None;
    };
    let value = decode_text_string(bytes);
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Decode a PDF text string: UTF-16BE when it starts with a byte-order mark,
/// lossy UTF-8 otherwise
fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    String::from_utf8_lossy(bytes).into_owned()
}
