//! Command-line interface

pub mod commands;
pub mod output;
pub mod progress;
pub mod table;
pub mod types;

use console::style;

pub use types::{ChatArgs, Cli, Commands, ConfigCommands, IndexArgs, SearchArgs};

/// Report a failed command and exit with status 1
pub fn handle_error(err: &anyhow::Error, json: bool) -> ! {
    if json {
        let body = serde_json::json!({ "error": format!("{err:#}") });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("{} {err:#}", style("Error:").red().bold());
    }
    std::process::exit(1)
}
