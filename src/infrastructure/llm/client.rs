use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client as ReqwestClient, Response};
use tracing::{debug, instrument};

use super::errors::LlmApiError;
use super::retry::RetryPolicy;
use super::streaming::SseStreamParser;
use super::types::{ApiErrorBody, ChatCompletionResponse};
use crate::domain::models::LlmConfig;
use crate::domain::ports::{ChatClient, ChatRequest, TokenStream};

/// Configuration for the chat-completions HTTP client
#[derive(Debug, Clone)]
pub struct LlmClientConfig {
    /// Bearer token
    pub api_key: String,

    /// Base URL, e.g. `https://api.groq.com/openai/v1`
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Retries after the first attempt for transient failures
    pub max_retries: u32,

    /// First backoff delay, doubled per retry
    pub initial_backoff_ms: u64,

    /// Upper bound on a single backoff delay
    pub max_backoff_ms: u64,
}

impl LlmClientConfig {
    /// Build from application config; fails when no API key is available
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .context("No API key configured: set llm.api_key, PDFQA_LLM__API_KEY or GROQ_API_KEY")?;

        Ok(Self {
            api_key,
            base_url: config.base_url.clone(),
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
            initial_backoff_ms: config.initial_backoff_ms,
            max_backoff_ms: config.max_backoff_ms,
        })
    }
}

/// HTTP client for OpenAI-compatible chat-completions endpoints
///
/// Features:
/// - Connection pooling and reuse (via `reqwest::Client`)
/// - Exponential backoff retry for transient errors
/// - Error classification (transient vs permanent)
/// - SSE streaming of response deltas
pub struct LlmClient {
    http_client: ReqwestClient,
    api_key: String,
    base_url: String,
    retry_policy: RetryPolicy,
}

impl LlmClient {
    /// Create a client from explicit configuration
    pub fn new(config: LlmClientConfig) -> Result<Self> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(10)
            .tcp_nodelay(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            api_key: config.api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry_policy: RetryPolicy::new(
                config.max_retries,
                config.initial_backoff_ms,
                config.max_backoff_ms,
            ),
        })
    }

    /// Create a client from the `llm` config section
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        Self::new(LlmClientConfig::from_config(config)?)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// POST the request and return the response if its status is a success
    async fn post(&self, request: &ChatRequest) -> Result<Response, LlmApiError> {
        let response = self
            .http_client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error response".to_string());
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or(body);

        Err(LlmApiError::from_status(status, message))
    }

    async fn complete_once(&self, request: &ChatRequest) -> Result<String, LlmApiError> {
        let response = self.post(request).await?;
        let body = response.bytes().await?;
        let parsed: ChatCompletionResponse = serde_json::from_slice(&body)?;

        parsed
            .into_text()
            .ok_or_else(|| LlmApiError::InvalidResponse("response has no choices".to_string()))
    }
}

#[async_trait]
impl ChatClient for LlmClient {
    #[instrument(skip_all, fields(model = %request.model, messages = request.messages.len()))]
    async fn complete(&self, request: ChatRequest) -> Result<String> {
        let request = ChatRequest {
            stream: false,
            ..request
        };

        let text = self
            .retry_policy
            .execute(|| self.complete_once(&request))
            .await?;

        debug!(chars = text.len(), "completion received");
        Ok(text)
    }

    #[instrument(skip_all, fields(model = %request.model, messages = request.messages.len()))]
    async fn stream(&self, request: ChatRequest) -> Result<TokenStream> {
        let request = ChatRequest {
            stream: true,
            ..request
        };

        // Only opening the stream is retried; a broken stream surfaces as an item
        let response = self.retry_policy.execute(|| self.post(&request)).await?;
        debug!("stream opened");

        let tokens = SseStreamParser::new(response.bytes_stream()).map(|item| item.map_err(anyhow::Error::from));
        Ok(Box::pin(tokens))
    }
}
