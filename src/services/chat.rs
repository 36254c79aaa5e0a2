//! One conversational turn: rewrite, retrieve, generate

use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, error, info, instrument};

use super::prompts::{
    context_system_prompt, general_knowledge_system_prompt, generation_error_message,
    rewrite_note, NO_CONTEXT_FOUND,
};
use super::query_rewriter::QueryRewriter;
use super::retriever::Retriever;
use crate::domain::models::{Config, ConversationTurn, DocumentStore, RetrievalResult, Role, Session};
use crate::domain::ports::{ChatClient, ChatMessage, ChatRequest};

/// Per-turn settings, usually taken from [`Config`] and overridden by the CLI
#[derive(Debug, Clone)]
pub struct ChatOptions {
    /// Generation model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Completion token cap
    pub max_tokens: u32,
    /// Excerpts to retrieve per question
    pub top_k: usize,
    /// Answer from the active document when one is set
    pub use_rag: bool,
    /// Rewrite follow-up questions before retrieval
    pub rewrite: bool,
    /// Prior turns included in the generation prompt
    pub history_limit: usize,
    /// Adds a system note to the prompt when the query was rewritten
    pub debug: bool,
}

impl ChatOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.llm.model.clone(),
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
            top_k: config.retrieval.top_k,
            use_rag: config.chat.use_rag,
            rewrite: config.rewrite.enabled,
            history_limit: config.chat.history_limit,
            debug: config.chat.debug,
        }
    }
}

/// What a chat turn produced
#[derive(Debug, Clone)]
pub struct ChatTurnOutcome {
    /// Assistant text, or the apology message when generation failed
    pub answer: String,
    /// Query used for retrieval and generation after rewriting
    pub effective_query: String,
    /// Context block given to the model, if retrieval ran
    pub context: Option<String>,
    /// Retrieved excerpts, closest first
    pub results: Vec<RetrievalResult>,
    /// Whether generation failed before completing
    pub failed: bool,
}

impl ChatTurnOutcome {
    pub fn was_rewritten(&self, original: &str) -> bool {
        self.effective_query != original
    }
}

/// Orchestrates rewriting, retrieval and streamed generation
pub struct ChatService {
    client: Arc<dyn ChatClient>,
    rewriter: QueryRewriter,
    retriever: Retriever,
}

impl ChatService {
    pub fn new(client: Arc<dyn ChatClient>, rewriter: QueryRewriter, retriever: Retriever) -> Self {
        Self {
            client,
            rewriter,
            retriever,
        }
    }

    /// Run one turn for `user_text`, passing each generated delta to `on_token`
    ///
    /// The user and assistant turns are appended to `session`. Generation
    /// errors are reported in the answer text, never returned.
    #[instrument(skip_all, fields(session = %session.name, model = %options.model))]
    pub async fn chat_turn<F>(
        &self,
        session: &mut Session,
        store: &DocumentStore,
        user_text: &str,
        options: &ChatOptions,
        mut on_token: F,
    ) -> ChatTurnOutcome
    where
        F: FnMut(&str) + Send,
    {
        session.push(ConversationTurn::user(user_text));

        let effective_query = if options.rewrite && session.history.len() > 1 {
            self.rewriter.rewrite(user_text, &session.history).await
        } else {
            user_text.to_string()
        };
        if effective_query != user_text {
            info!(original = user_text, rewritten = %effective_query, "using rewritten query");
        }

        let document = session
            .active_document
            .as_deref()
            .and_then(|name| store.get(name))
            .filter(|_| options.use_rag);

        let (system_prompt, context, results) = match document {
            Some(document) => {
                let results = self
                    .retriever
                    .retrieve(&effective_query, document, options.top_k)
                    .await;
                let context = if results.is_empty() {
                    NO_CONTEXT_FOUND.to_string()
                } else {
                    Retriever::format_context(&results)
                };
                debug!(results = results.len(), document = %document.name, "retrieved context");
                (context_system_prompt(&context), Some(context), results)
            }
            None => (general_knowledge_system_prompt(), None, Vec::new()),
        };

        let messages = build_messages(session, &system_prompt, user_text, &effective_query, options);
        let request = ChatRequest::new(options.model.clone(), messages)
            .with_temperature(options.temperature)
            .with_max_tokens(options.max_tokens);

        let (answer, failed) = match self.generate(request, &mut on_token).await {
            Ok(answer) => (answer, false),
            Err(e) => {
                error!(error = %e, "response generation failed");
                (generation_error_message(&e), true)
            }
        };

        session.push(ConversationTurn::assistant(answer.clone()));

        ChatTurnOutcome {
            answer,
            effective_query,
            context,
            results,
            failed,
        }
    }

    async fn generate<F>(&self, request: ChatRequest, on_token: &mut F) -> anyhow::Result<String>
    where
        F: FnMut(&str) + Send,
    {
        let mut stream = self.client.stream(request).await?;
        let mut answer = String::new();

        while let Some(delta) = stream.next().await {
            let delta = delta?;
            on_token(&delta);
            answer.push_str(&delta);
        }

        Ok(answer)
    }
}

/// System prompt followed by the recent dialogue, with the latest user
/// message replaced by its rewrite
fn build_messages(
    session: &Session,
    system_prompt: &str,
    user_text: &str,
    effective_query: &str,
    options: &ChatOptions,
) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(system_prompt)];
    messages.extend(
        session
            .recent_dialogue(options.history_limit)
            .into_iter()
            .map(ChatMessage::from),
    );

    let rewritten = effective_query != user_text;
    let last_is_query = messages
        .last()
        .is_some_and(|m| m.role == Role::User.as_str() && m.content == user_text);

    if rewritten && last_is_query {
        if let Some(last) = messages.last_mut() {
            last.content = effective_query.to_string();
        }
        if options.debug {
            let at = messages.len() - 1;
            messages.insert(at, ChatMessage::system(rewrite_note(user_text, effective_query)));
        }
    }

    messages
}
