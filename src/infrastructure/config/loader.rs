use std::path::Path;

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use thiserror::Error;

use crate::domain::models::config::{Config, MAX_TOKENS_LIMIT};

/// Environment variable consulted when `llm.api_key` is not configured
pub const API_KEY_FALLBACK_VAR: &str = "GROQ_API_KEY";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid chunk_size: {0}. Must be at least 1")]
    InvalidChunkSize(usize),

    #[error("Invalid embedding batch_size: {0}. Must be at least 1")]
    InvalidBatchSize(usize),

    #[error("Invalid embedding dimension: {0}. Must be at least 1")]
    InvalidDimension(usize),

    #[error("Invalid top_k: {top_k}. Must be between 1 and {max_top_k}")]
    InvalidTopK { top_k: usize, max_top_k: usize },

    #[error("Invalid temperature: {0}. Must be between 0.0 and 2.0")]
    InvalidTemperature(f32),

    #[error("Invalid max_tokens: {0}. Must be between 1 and {MAX_TOKENS_LIMIT}")]
    InvalidMaxTokens(u32),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid max_retries: {0}. Cannot be 0")]
    InvalidMaxRetries(u32),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .pdfqa/config.yaml (project config)
    /// 3. .pdfqa/local.yaml (local overrides, optional)
    /// 4. Environment variables (PDFQA_* prefix, `__` separates nesting)
    ///
    /// `GROQ_API_KEY` fills `llm.api_key` when nothing else set it.
    pub fn load() -> Result<Config> {
        Self::load_from_dir(".")
    }

    /// Load configuration rooted at `dir` instead of the working directory
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Config> {
        let project = dir.as_ref().join(".pdfqa");

        let mut config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(project.join("config.yaml")))
            .merge(Yaml::file(project.join("local.yaml")))
            .merge(Env::prefixed("PDFQA_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::apply_api_key_fallback(&mut config);
        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let mut config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::apply_api_key_fallback(&mut config);
        Self::validate(&config)?;
        Ok(config)
    }

    fn apply_api_key_fallback(config: &mut Config) {
        let configured = config
            .llm
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty());

        if !configured {
            config.llm.api_key = std::env::var(API_KEY_FALLBACK_VAR)
                .ok()
                .filter(|key| !key.trim().is_empty());
        }
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.chunking.chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize(config.chunking.chunk_size));
        }

        if config.embedding.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize(config.embedding.batch_size));
        }

        if config.embedding.dimension == 0 {
            return Err(ConfigError::InvalidDimension(config.embedding.dimension));
        }

        let retrieval = &config.retrieval;
        if retrieval.top_k == 0 || retrieval.top_k > retrieval.max_top_k {
            return Err(ConfigError::InvalidTopK {
                top_k: retrieval.top_k,
                max_top_k: retrieval.max_top_k,
            });
        }

        for temperature in [config.llm.temperature, config.rewrite.temperature] {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::InvalidTemperature(temperature));
            }
        }

        for max_tokens in [config.llm.max_tokens, config.rewrite.max_tokens] {
            if max_tokens == 0 || max_tokens > MAX_TOKENS_LIMIT {
                return Err(ConfigError::InvalidMaxTokens(max_tokens));
            }
        }

        // Validate logging config
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        // Validate retry config
        if config.llm.max_retries == 0 {
            return Err(ConfigError::InvalidMaxRetries(config.llm.max_retries));
        }

        if config.llm.initial_backoff_ms >= config.llm.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.llm.initial_backoff_ms,
                config.llm.max_backoff_ms,
            ));
        }

        if config.llm.models.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "llm.models cannot be empty".to_string(),
            ));
        }

        if !config.llm.models.contains(&config.llm.model) {
            return Err(ConfigError::ValidationFailed(format!(
                "llm.model '{}' is not listed in llm.models",
                config.llm.model
            )));
        }

        Ok(())
    }
}
