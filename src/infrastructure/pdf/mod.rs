//! PDF document parsing
//!
//! Per-page plain text extraction with section heading detection, and
//! document metadata from the info dictionary.

pub mod parser;
pub mod sections;

pub use parser::PdfParser;
pub use sections::{detect_section, SECTION_SCAN_CHARS};
