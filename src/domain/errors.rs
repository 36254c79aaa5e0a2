//! Domain errors for the retrieval pipeline.

use thiserror::Error;

/// Errors raised while splitting text into chunks.
#[derive(Debug, Error)]
pub enum ChunkingError {
    #[error("Invalid chunking configuration: {0}")]
    InvalidConfig(String),
}

/// Errors raised by the vector index.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("Index dimension must be greater than 0")]
    ZeroDimension,

    #[error("Dimension mismatch: index has {expected}, vector has {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
