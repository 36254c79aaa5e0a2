//! Chat-completions HTTP adapter
//!
//! Implements the `ChatClient` port against OpenAI-compatible endpoints
//! (Groq by default): non-streaming and SSE streaming calls with retry and
//! error classification.

pub mod client;
pub mod errors;
pub mod retry;
pub mod streaming;
pub mod types;

pub use client::{LlmClient, LlmClientConfig};
pub use errors::LlmApiError;
pub use retry::RetryPolicy;
pub use streaming::SseStreamParser;
