//! Infrastructure layer
//!
//! Adapters behind the domain ports plus the ambient services:
//! - `config`: figment-based configuration loading
//! - `llm`: OpenAI-compatible chat-completions client
//! - `logging`: tracing subscriber setup
//! - `pdf`: PDF text extraction and section detection
//! - `vector`: chunking, embedding models, embedding cache and the flat index

pub mod config;
pub mod llm;
pub mod logging;
pub mod pdf;
pub mod vector;
