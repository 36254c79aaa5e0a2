//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - YAML file loading from `.pdfqa/`
//! - Environment variable overrides (`PDFQA_*`)
//! - Configuration validation

pub mod loader;

pub use loader::{ConfigError, ConfigLoader, API_KEY_FALLBACK_VAR};
