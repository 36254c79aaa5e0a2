//! pdfqa - PDF question answering
//!
//! pdfqa turns PDF documents into searchable indexes and answers questions
//! about them with retrieval-augmented generation. Follow-up questions are
//! rewritten into standalone queries before retrieval.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - **Domain Layer** (`domain`): models, ports and typed errors
//! - **Service Layer** (`services`): indexing, retrieval, rewriting and chat orchestration
//! - **Infrastructure Layer** (`infrastructure`): PDF parsing, embeddings, vector index, LLM client, config and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use pdfqa::{ConfigLoader, DocumentIndexer, Retriever};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let indexer = DocumentIndexer::from_config(&config)?;
//!     let document = indexer.index_pdf("paper.pdf", None).await?;
//!     let retriever = Retriever::new(indexer.embedder().model().clone(), config.retrieval.max_top_k);
//!     let results = retriever.retrieve("What was measured?", &document, 5).await;
//!     println!("{}", Retriever::format_context(&results));
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    Chunk, ChunkingConfig, Config, ConversationTurn, DocumentIndex, DocumentStore, ParsedDocument,
    RetrievalResult, Role, Session,
};
pub use domain::ports::{ChatClient, ChatMessage, ChatRequest, EmbeddingService};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{ChatOptions, ChatService, DocumentIndexer, QueryRewriter, Retriever};
