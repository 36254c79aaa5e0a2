//! `pdfqa config`

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::cli::types::ConfigCommands;
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

const REDACTED: &str = "********";

/// Effective configuration with secrets masked
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    #[serde(flatten)]
    pub config: Config,
}

impl ConfigOutput {
    pub fn redacted(config: &Config) -> Self {
        let mut config = config.clone();
        if config.llm.api_key.is_some() {
            config.llm.api_key = Some(REDACTED.to_string());
        }
        Self { config }
    }
}

impl CommandOutput for ConfigOutput {
    fn to_human(&self) -> String {
        serde_yaml::to_string(&self.config).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
struct ValidationOutput {
    valid: bool,
}

impl CommandOutput for ValidationOutput {
    fn to_human(&self) -> String {
        "Configuration is valid".to_string()
    }
}

pub fn execute(command: &ConfigCommands, config: &Config, json: bool) -> Result<()> {
    match command {
        ConfigCommands::Show => output(&ConfigOutput::redacted(config), json),
        ConfigCommands::Validate => {
            ConfigLoader::validate(config).context("Configuration is invalid")?;
            output(&ValidationOutput { valid: true }, json);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_is_redacted() {
        let mut config = Config::default();
        config.llm.api_key = Some("gsk-secret".to_string());

        let human = ConfigOutput::redacted(&config).to_human();
        assert!(!human.contains("gsk-secret"));
        assert!(human.contains(REDACTED));
        assert!(human.contains("chunk_size: 900"));
    }
}
