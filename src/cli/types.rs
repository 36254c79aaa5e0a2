//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pdfqa")]
#[command(about = "pdfqa - Ask questions about PDF documents", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Load configuration from this file instead of .pdfqa/
    #[arg(short, long, global = true, env = "PDFQA_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse, chunk and embed a PDF, warming the embedding cache
    Index(IndexArgs),

    /// Show the excerpts retrieved for a query
    Search(SearchArgs),

    /// Chat about one or more PDFs
    Chat(ChatArgs),

    /// List the available generation models
    Models,

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args, Debug)]
pub struct IndexArgs {
    /// Path to the PDF file
    pub pdf: PathBuf,

    /// Document name (defaults to the file stem)
    #[arg(short, long)]
    pub name: Option<String>,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Path to the PDF file
    pub pdf: PathBuf,

    /// Query text
    pub query: String,

    /// Number of excerpts to retrieve
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Print full excerpt text instead of a table
    #[arg(long)]
    pub full: bool,
}

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// PDF files to load; the last one becomes the active document
    pub pdfs: Vec<PathBuf>,

    /// Generation model
    #[arg(short, long)]
    pub model: Option<String>,

    /// Sampling temperature (0.0 - 2.0)
    #[arg(short, long)]
    pub temperature: Option<f32>,

    /// Maximum tokens in a response
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Number of excerpts to retrieve per question
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Answer from general knowledge only
    #[arg(long)]
    pub no_rag: bool,

    /// Disable follow-up query rewriting
    #[arg(long)]
    pub no_rewrite: bool,

    /// Show rewritten queries and retrieved context
    #[arg(short, long)]
    pub debug: bool,

    /// Session name
    #[arg(short, long, default_value = "Default")]
    pub session: String,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Validate the configuration
    Validate,
}
