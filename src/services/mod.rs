//! Application services
//!
//! Orchestration on top of the domain ports and infrastructure adapters:
//! document indexing, retrieval, query rewriting and chat turns.

pub mod chat;
pub mod indexer;
pub mod prompts;
pub mod query_rewriter;
pub mod retriever;

pub use chat::{ChatOptions, ChatService, ChatTurnOutcome};
pub use indexer::{content_hash, safe_name, DocumentIndexer};
pub use query_rewriter::QueryRewriter;
pub use retriever::Retriever;
