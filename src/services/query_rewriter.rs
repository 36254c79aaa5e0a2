//! Follow-up query rewriting

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use super::prompts::{rewrite_prompt, REWRITE_SYSTEM_PROMPT};
use crate::domain::models::{ConversationTurn, RewriteConfig, Role};
use crate::domain::ports::{ChatClient, ChatMessage, ChatRequest};

/// Turns context-dependent follow-ups ("how does it work?") into standalone
/// questions using the previous exchange
///
/// Rewriting is best effort: every failure path returns the original query.
pub struct QueryRewriter {
    client: Arc<dyn ChatClient>,
    config: RewriteConfig,
}

impl QueryRewriter {
    pub fn new(client: Arc<dyn ChatClient>, config: RewriteConfig) -> Self {
        Self { client, config }
    }

    pub const fn config(&self) -> &RewriteConfig {
        &self.config
    }

    /// Standalone form of `query` given `history`
    ///
    /// `history` may already end with `query` as the latest user turn.
    #[instrument(skip_all, fields(history = history.len()))]
    pub async fn rewrite(&self, query: &str, history: &[ConversationTurn]) -> String {
        if history.len() < 2 {
            return query.to_string();
        }

        let Some((question, answer)) = self.previous_exchange(history) else {
            debug!("no previous exchange to rewrite against");
            return query.to_string();
        };

        let question = truncate_chars(question, self.config.max_user_chars);
        let answer = truncate_chars(answer, self.config.max_assistant_chars);
        let excerpt = format!(
            "{}...",
            answer.chars().take(self.config.prompt_excerpt_chars).collect::<String>()
        );

        let request = ChatRequest::new(
            self.config.model.clone(),
            vec![
                ChatMessage::system(REWRITE_SYSTEM_PROMPT),
                ChatMessage::user(rewrite_prompt(&question, &excerpt, query)),
            ],
        )
        .with_temperature(self.config.temperature)
        .with_max_tokens(self.config.max_tokens);

        let output = match self.client.complete(request).await {
            Ok(output) => output,
            Err(e) => {
                warn!(error = %e, "query rewriting failed, using original query");
                return query.to_string();
            }
        };

        let rewritten = output.trim();
        let length = rewritten.chars().count();
        if rewritten.is_empty() || length < 5 || length > query.chars().count() * 3 {
            debug!(output = rewritten, "rejected rewrite");
            return query.to_string();
        }

        debug!(original = query, rewritten, "query rewritten");
        rewritten.to_string()
    }

    /// First user message directly followed by an assistant reply within
    /// the recent window
    fn previous_exchange<'a>(&self, history: &'a [ConversationTurn]) -> Option<(&'a str, &'a str)> {
        let start = history.len().saturating_sub(self.config.window);
        let (question, answer) = history[start..]
            .windows(2)
            .find(|pair| pair[0].role == Role::User && pair[1].role == Role::Assistant)
            .map(|pair| (pair[0].content.as_str(), pair[1].content.as_str()))?;

        if question.is_empty() || answer.is_empty() {
            return None;
        }
        Some((question, answer))
    }
}

/// First `max` characters of `text`, with `...` appended when cut
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
