//! Domain models
//!
//! Plain data types shared by the parser, retrieval pipeline and chat service.

pub mod chunking;
pub mod config;
pub mod conversation;
pub mod document;
pub mod retrieval;
pub mod session;

pub use chunking::{Chunk, ChunkingConfig, PLACEHOLDER_CHUNK_CONTENT};
pub use config::{
    CacheKeyStrategy, ChatConfig, Config, EmbeddingBackend, EmbeddingConfig, LlmConfig,
    LoggingConfig, RetrievalConfig, RewriteConfig, MAX_TOKENS_LIMIT,
};
pub use conversation::{ConversationTurn, Role};
pub use document::{DocumentMetadata, PageText, ParsedDocument, DEFAULT_AUTHOR, DEFAULT_TITLE};
pub use retrieval::{DocumentIndex, RetrievalResult, NO_SECTION};
pub use session::{DocumentStore, Session};
