use anyhow::Result;
use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::domain::models::{ConversationTurn, Role};

/// Stream of generated text deltas
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// A single message in a chat-completions request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message author ("system", "user" or "assistant")
    pub role: String,

    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role: role.as_str().to_string(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
}

impl From<&ConversationTurn> for ChatMessage {
    fn from(turn: &ConversationTurn) -> Self {
        Self::new(turn.role, turn.content.clone())
    }
}

/// Request for a chat completion
///
/// # Example
/// ```
/// use pdfqa::domain::ports::{ChatMessage, ChatRequest};
///
/// let request = ChatRequest::new(
///     "llama-3.3-70b-versatile",
///     vec![ChatMessage::user("Hello!")],
/// )
/// .with_temperature(0.2)
/// .with_max_tokens(64);
/// assert!(!request.stream);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier
    pub model: String,

    /// System prompt and conversation, oldest first
    pub messages: Vec<ChatMessage>,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Request server-sent events instead of a single response
    pub stream: bool,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: 0.7,
            max_tokens: 1024,
            stream: false,
        }
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Port trait for a chat-completions text generator
///
/// This is a **port** in hexagonal architecture terminology. Services depend
/// on this trait, not on the HTTP adapter, so tests can substitute a scripted
/// client.
///
/// Implementations must be `Send + Sync`. Adapters retry transient failures
/// (rate limits, network errors, 5xx) and fail fast on permanent ones.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send a request and wait for the complete response text
    async fn complete(&self, request: ChatRequest) -> Result<String>;

    /// Send a request and stream the response text as it is generated
    ///
    /// Errors can occur both when opening the stream (returned as `Err`) and
    /// mid-stream (yielded as `Err` items).
    async fn stream(&self, request: ChatRequest) -> Result<TokenStream>;
}
