//! OpenAI chat-completions wire types
//!
//! Requests are the serialized [`ChatRequest`](crate::domain::ports::ChatRequest)
//! itself; only the response shapes live here.

use serde::{Deserialize, Serialize};

/// Non-streaming response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    /// Provider-assigned completion id
    #[serde(default)]
    pub id: Option<String>,

    /// Generated alternatives; only the first is used
    pub choices: Vec<Choice>,

    /// Token accounting, when reported
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// One generated alternative
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    /// Generated message
    pub message: ResponseMessage,

    /// Why generation stopped, e.g. `stop` or `length`
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Assistant message inside a [`Choice`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMessage {
    /// Usually `assistant`
    #[serde(default)]
    pub role: Option<String>,

    /// Message text
    #[serde(default)]
    pub content: Option<String>,
}

/// Token accounting reported by the provider
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt
    pub prompt_tokens: u32,

    /// Tokens generated
    pub completion_tokens: u32,

    /// Sum of both
    pub total_tokens: u32,
}

/// One `data:` payload of a streaming response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    /// Incremental choices
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    /// Providers report mid-stream failures in-band
    #[serde(default)]
    pub error: Option<ApiErrorDetail>,
}

/// One choice of a streaming chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkChoice {
    /// Text added by this chunk
    #[serde(default)]
    pub delta: Delta,

    /// Set on the final chunk of a choice
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Incremental message content
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Delta {
    /// New text, absent on role-only chunks
    #[serde(default)]
    pub content: Option<String>,
}

/// Error body, e.g. `{"error": {"message": "..."}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Error details
    pub error: ApiErrorDetail,
}

/// Provider error message and type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    /// Human-readable message
    pub message: String,

    /// Provider error category
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
}

impl ChatCompletionResponse {
    /// Text of the first choice
    pub fn into_text(self) -> Option<String> {
        self.choices.into_iter().next().and_then(|c| c.message.content)
    }
}

impl ChatCompletionChunk {
    /// Text delta of the first choice, if any
    pub fn delta_text(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.delta.content.as_deref())
    }
}
