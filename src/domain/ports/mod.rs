//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that infrastructure adapters must implement:
//! - EmbeddingService: text to fixed-dimension vectors
//! - ChatClient: chat-completions text generation
//!
//! Services depend on these traits, so tests can swap in scripted doubles.

pub mod chat_client;
pub mod embedding;

pub use chat_client::{ChatClient, ChatMessage, ChatRequest, TokenStream};
pub use embedding::EmbeddingService;
