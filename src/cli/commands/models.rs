//! `pdfqa models`

use anyhow::Result;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

/// Configured generation models
#[derive(Debug, Serialize)]
pub struct ModelsOutput {
    /// Model used when none is given
    pub default: String,
    /// All selectable models
    pub models: Vec<String>,
}

impl CommandOutput for ModelsOutput {
    fn to_human(&self) -> String {
        let mut lines = vec!["Available models:".to_string()];
        for model in &self.models {
            let marker = if *model == self.default { "*" } else { " " };
            lines.push(format!(" {marker} {model}"));
        }
        lines.push(String::new());
        lines.push("* default (llm.model)".to_string());
        lines.join("\n")
    }
}

pub fn execute(config: &Config, json: bool) -> Result<()> {
    output(
        &ModelsOutput {
            default: config.llm.model.clone(),
            models: config.llm.models.clone(),
        },
        json,
    );
    Ok(())
}
