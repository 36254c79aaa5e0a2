//! Domain layer for pdfqa
//!
//! This module contains the data model and the port traits that the
//! infrastructure adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{ChunkingError, IndexError};
