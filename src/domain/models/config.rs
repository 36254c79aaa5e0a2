use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::chunking::ChunkingConfig;

/// Main configuration structure for pdfqa
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Text chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Embedding model and cache configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Follow-up query rewriting configuration
    #[serde(default)]
    pub rewrite: RewriteConfig,

    /// Chat-completions endpoint configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Chat turn behaviour
    #[serde(default)]
    pub chat: ChatConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which embedding model implementation to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingBackend {
    /// BERT sentence-transformer on CPU
    #[default]
    Bert,
    /// Feature-hashing bag of words, no model download
    Hash,
}

/// How embedding cache entries are keyed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKeyStrategy {
    /// Sanitized document name
    #[default]
    DocumentName,
    /// SHA-256 of the extracted text
    ContentHash,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EmbeddingConfig {
    /// Model implementation
    #[serde(default)]
    pub backend: EmbeddingBackend,

    /// Hugging Face model repository
    #[serde(default = "default_embedding_model_id")]
    pub model_id: String,

    /// Vector dimension (used by the hash backend; BERT reads it from the model)
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Chunks embedded per model call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Directory for cached embedding files
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Cache key derivation
    #[serde(default)]
    pub cache_key: CacheKeyStrategy,
}

fn default_embedding_model_id() -> String {
    "BAAI/bge-base-en-v1.5".to_string()
}

const fn default_dimension() -> usize {
    768
}

const fn default_batch_size() -> usize {
    16
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./cache")
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::default(),
            model_id: default_embedding_model_id(),
            dimension: default_dimension(),
            batch_size: default_batch_size(),
            cache_dir: default_cache_dir(),
            cache_key: CacheKeyStrategy::default(),
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetrievalConfig {
    /// Default number of excerpts per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Upper bound for a requested `k`
    #[serde(default = "default_max_top_k")]
    pub max_top_k: usize,
}

const fn default_top_k() -> usize {
    5
}

const fn default_max_top_k() -> usize {
    10
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            max_top_k: default_max_top_k(),
        }
    }
}

/// Query rewriting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RewriteConfig {
    /// Rewrite follow-up questions before retrieval
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Small fast model used for rewriting
    #[serde(default = "default_rewrite_model")]
    pub model: String,

    #[serde(default = "default_rewrite_temperature")]
    pub temperature: f32,

    #[serde(default = "default_rewrite_max_tokens")]
    pub max_tokens: u32,

    /// Number of trailing turns scanned for the previous exchange
    #[serde(default = "default_rewrite_window")]
    pub window: usize,

    /// Character cap on the previous user question
    #[serde(default = "default_max_user_chars")]
    pub max_user_chars: usize,

    /// Character cap on the previous answer
    #[serde(default = "default_max_assistant_chars")]
    pub max_assistant_chars: usize,

    /// Characters of the previous answer quoted in the prompt
    #[serde(default = "default_prompt_excerpt_chars")]
    pub prompt_excerpt_chars: usize,
}

fn default_rewrite_model() -> String {
    "llama3-8b-8192".to_string()
}

const fn default_rewrite_temperature() -> f32 {
    0.1
}

const fn default_rewrite_max_tokens() -> u32 {
    100
}

const fn default_rewrite_window() -> usize {
    5
}

const fn default_max_user_chars() -> usize {
    500
}

const fn default_max_assistant_chars() -> usize {
    1000
}

const fn default_prompt_excerpt_chars() -> usize {
    300
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: default_rewrite_model(),
            temperature: default_rewrite_temperature(),
            max_tokens: default_rewrite_max_tokens(),
            window: default_rewrite_window(),
            max_user_chars: default_max_user_chars(),
            max_assistant_chars: default_max_assistant_chars(),
            prompt_excerpt_chars: default_prompt_excerpt_chars(),
        }
    }
}

/// OpenAI-compatible chat-completions endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LlmConfig {
    /// Base URL; requests go to `{base_url}/chat/completions`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token (falls back to `GROQ_API_KEY`)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Default generation model
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Models offered for selection
    #[serde(default = "default_models")]
    pub models: Vec<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of retry attempts for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

/// Upper bound accepted for `max_tokens`
pub const MAX_TOKENS_LIMIT: u32 = 32768;

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_llm_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_models() -> Vec<String> {
    [
        "llama-3.3-70b-versatile",
        "llama3-70b-8192",
        "deepseek-r1-distill-llama-70b",
        "gemma2-9b-it",
        "meta-llama/llama-4-scout-17b-16e-instruct",
        "qwen-qwq-32b",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

const fn default_temperature() -> f32 {
    0.7
}

const fn default_max_tokens() -> u32 {
    1024
}

const fn default_timeout_secs() -> u64 {
    120
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    1000
}

const fn default_max_backoff_ms() -> u64 {
    30_000
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_llm_model(),
            models: default_models(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Chat turn configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ChatConfig {
    /// Ground answers in retrieved excerpts
    #[serde(default = "default_true")]
    pub use_rag: bool,

    /// Number of recent non-system turns sent to the model
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Tell the model when the query was rewritten
    #[serde(default)]
    pub debug: bool,
}

const fn default_history_limit() -> usize {
    5
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            use_rag: true,
            history_limit: default_history_limit(),
            debug: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for json log files (stderr only when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.chunking.chunk_size, 900);
        assert_eq!(config.embedding.batch_size, 16);
        assert_eq!(config.embedding.dimension, 768);
        assert_eq!(config.embedding.backend, EmbeddingBackend::Bert);
        assert_eq!(config.embedding.cache_key, CacheKeyStrategy::DocumentName);
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.rewrite.model, "llama3-8b-8192");
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
        assert_eq!(config.llm.models.len(), 6);
        assert!(config.chat.use_rag);
        assert_eq!(config.chat.history_limit, 5);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r"
embedding:
  backend: hash
  cache_key: content_hash
retrieval:
  top_k: 3
";
        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");
        assert_eq!(config.embedding.backend, EmbeddingBackend::Hash);
        assert_eq!(config.embedding.cache_key, CacheKeyStrategy::ContentHash);
        assert_eq!(config.embedding.model_id, "BAAI/bge-base-en-v1.5");
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.retrieval.max_top_k, 10);
        assert_eq!(config.chunking.overlap, 40);
    }
}
