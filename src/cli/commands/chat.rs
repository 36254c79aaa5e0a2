//! `pdfqa chat`: interactive question answering over loaded PDFs

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use console::style;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::load_indexer;
use crate::cli::output::{output, CommandOutput};
use crate::cli::progress::spinner;
use crate::cli::types::ChatArgs;
use crate::domain::models::{Config, DocumentStore, RetrievalResult, Session, MAX_TOKENS_LIMIT};
use crate::domain::ports::ChatClient;
use crate::infrastructure::llm::LlmClient;
use crate::services::{ChatOptions, ChatService, DocumentIndexer, QueryRewriter, Retriever};

const HELP: &str = "\
Commands:
  /load <path>   load a PDF and make it the active document
  /use <name>    switch the active document
  /unload <name> forget a loaded document
  /reset         stop answering from the active document
  /docs          list loaded documents
  /clear         clear the conversation history
  /help          show this help
  /quit          exit";

/// One answered question in JSON mode
#[derive(Debug, Serialize)]
pub struct TurnOutput {
    /// Question as typed
    pub query: String,
    /// Question after follow-up rewriting
    pub effective_query: String,
    /// Assistant reply or the failure message
    pub answer: String,
    /// Whether generation failed
    pub failed: bool,
    /// Active document when the question was asked
    pub document: Option<String>,
    /// Excerpts retrieved for the question
    pub results: Vec<RetrievalResult>,
}

impl CommandOutput for TurnOutput {
    fn to_human(&self) -> String {
        self.answer.clone()
    }
}

/// Per-turn options from configuration and command-line overrides
pub fn chat_options(args: &ChatArgs, config: &Config) -> Result<ChatOptions> {
    let mut options = ChatOptions::from_config(config);

    if let Some(model) = &args.model {
        ensure!(
            config.llm.models.contains(model),
            "Unknown model '{model}'. Run `pdfqa models` to list available models"
        );
        options.model.clone_from(model);
    }
    if let Some(temperature) = args.temperature {
        ensure!(
            (0.0..=2.0).contains(&temperature),
            "Temperature must be between 0.0 and 2.0, got {temperature}"
        );
        options.temperature = temperature;
    }
    if let Some(max_tokens) = args.max_tokens {
        ensure!(
            (1..=MAX_TOKENS_LIMIT).contains(&max_tokens),
            "max_tokens must be between 1 and {MAX_TOKENS_LIMIT}, got {max_tokens}"
        );
        options.max_tokens = max_tokens;
    }
    if let Some(top_k) = args.top_k {
        let max = config.retrieval.max_top_k;
        ensure!((1..=max).contains(&top_k), "top_k must be between 1 and {max}, got {top_k}");
        options.top_k = top_k;
    }

    options.use_rag &= !args.no_rag;
    options.rewrite &= !args.no_rewrite;
    options.debug |= args.debug;
    Ok(options)
}

/// Mutable REPL state
struct ChatState {
    indexer: DocumentIndexer,
    store: DocumentStore,
    session: Session,
    json: bool,
}

impl ChatState {
    async fn load(&mut self, path: &Path) -> Result<()> {
        let progress = spinner(format!("Processing {}", path.display()), self.json);
        let document = self.indexer.index_pdf(path, None).await;
        progress.finish_and_clear();
        let document = document.with_context(|| format!("Failed to load {}", path.display()))?;

        let name = document.name.clone();
        let chunks = document.chunks.len();
        if self.store.insert(document).is_some() {
            tracing::info!(document = %name, "replaced previously loaded document");
        }
        self.session.set_active_document(name.clone());

        if !self.json {
            eprintln!("{} {name} ({chunks} chunks)", style("Loaded").green());
        }
        Ok(())
    }

    /// Remove `name` from the store, deactivating it if it was active
    fn unload(&mut self, name: &str) -> bool {
        if self.store.remove(name).is_none() {
            return false;
        }
        if self.session.active_document.as_deref() == Some(name) {
            self.session.clear_active_document();
        }
        tracing::info!(document = %name, "unloaded document");
        true
    }

    fn list_documents(&self) {
        if self.store.is_empty() {
            eprintln!("No documents loaded. Use /load <path>.");
            return;
        }
        for name in self.store.names() {
            let marker = if self.session.active_document.as_deref() == Some(name) {
                "*"
            } else {
                " "
            };
            eprintln!(" {marker} {name}");
        }
    }

    /// Handle a `/command`; returns false when the REPL should exit
    async fn command(&mut self, line: &str) -> bool {
        let (command, argument) = line.split_once(' ').unwrap_or((line, ""));
        let argument = argument.trim();

        match command {
            "quit" | "exit" | "q" => return false,
            "help" => eprintln!("{HELP}"),
            "docs" => self.list_documents(),
            "clear" => {
                self.session.clear_history();
                eprintln!("Conversation cleared.");
            }
            "use" | "unload" if !self.store.contains(argument) => {
                eprintln!("Unknown document '{argument}'. Use /docs to list documents.");
            }
            "use" => {
                self.session.set_active_document(argument);
                eprintln!("Active document: {argument}");
            }
            "unload" => {
                self.unload(argument);
                eprintln!("Unloaded {argument}.");
            }
            "reset" => match self.session.clear_active_document() {
                Some(name) => eprintln!("No longer answering from {name}."),
                None => eprintln!("No active document."),
            },
            "load" if !argument.is_empty() => {
                if let Err(e) = self.load(Path::new(argument)).await {
                    eprintln!("{} {e:#}", style("Error:").red().bold());
                }
            }
            _ => eprintln!("Unknown command '/{line}'.\n{HELP}"),
        }
        true
    }
}

pub async fn execute(args: ChatArgs, config: &Config, json: bool) -> Result<()> {
    let options = chat_options(&args, config)?;

    let client: Arc<dyn ChatClient> = Arc::new(LlmClient::from_config(&config.llm)?);
    let indexer = load_indexer(config, json).await?;

    let retriever = Retriever::new(indexer.embedder().model().clone(), config.retrieval.max_top_k);
    let rewriter = QueryRewriter::new(client.clone(), config.rewrite.clone());
    let service = ChatService::new(client, rewriter, retriever);

    let mut state = ChatState {
        indexer,
        store: DocumentStore::new(),
        session: Session::new(args.session.clone()),
        json,
    };
    for pdf in &args.pdfs {
        state.load(pdf).await?;
    }

    if !json {
        eprintln!(
            "Chatting with {} (RAG {}). Type /help for commands.",
            style(&options.model).bold(),
            if options.use_rag { "on" } else { "off" }
        );
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if !json {
            print!("{} ", style("you>").cyan().bold());
            std::io::stdout().flush().ok();
        }

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(command) = line.strip_prefix('/') {
            if state.command(command).await {
                continue;
            }
            break;
        }

        ask(&service, &mut state, line, &options).await;
    }

    Ok(())
}

async fn ask(service: &ChatService, state: &mut ChatState, question: &str, options: &ChatOptions) {
    let json = state.json;
    if !json {
        print!("{} ", style("assistant>").magenta().bold());
        std::io::stdout().flush().ok();
    }

    let mut streamed = false;
    let on_token = |token: &str| {
        if !json {
            streamed = true;
            print!("{token}");
            std::io::stdout().flush().ok();
        }
    };

    let outcome = service
        .chat_turn(&mut state.session, &state.store, question, options, on_token)
        .await;

    if json {
        output(
            &TurnOutput {
                query: question.to_string(),
                effective_query: outcome.effective_query,
                answer: outcome.answer,
                failed: outcome.failed,
                document: state.session.active_document.clone(),
                results: outcome.results,
            },
            true,
        );
        return;
    }

    if outcome.failed {
        if streamed {
            println!();
        }
        println!("{}", style(&outcome.answer).red());
    } else {
        println!();
    }

    if options.debug {
        if outcome.was_rewritten(question) {
            eprintln!("{} {}", style("rewritten query:").dim(), outcome.effective_query);
        }
        if let Some(context) = &outcome.context {
            eprintln!("{}\n{context}", style("retrieved context:").dim());
        }
    }
}
