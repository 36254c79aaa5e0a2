//! Chat sessions and the processed-document store
//!
//! Both are plain values owned by the caller; nothing here is global.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::conversation::{ConversationTurn, Role};
use super::retrieval::DocumentIndex;

/// A conversation with an optional active document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Ordered conversation history
    pub history: Vec<ConversationTurn>,

    /// Identity of the document queries are answered from
    pub active_document: Option<String>,

    /// When the session started
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Create an empty session
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            history: Vec::new(),
            active_document: None,
            created_at: Utc::now(),
        }
    }

    /// Make `document` the source for retrieval
    pub fn set_active_document(&mut self, document: impl Into<String>) {
        self.active_document = Some(document.into());
    }

    /// Stop answering from a document, returning the one that was active
    pub fn clear_active_document(&mut self) -> Option<String> {
        self.active_document.take()
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.history.push(turn);
    }

    /// Drop the history, keeping the active document
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// The last `limit` turns that are not system messages, oldest first
    pub fn recent_dialogue(&self, limit: usize) -> Vec<&ConversationTurn> {
        let mut turns: Vec<&ConversationTurn> = self
            .history
            .iter()
            .rev()
            .filter(|turn| turn.role != Role::System)
            .take(limit)
            .collect();
        turns.reverse();
        turns
    }
}

/// Processed documents keyed by identity
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: HashMap<String, DocumentIndex>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document, replacing any previous entry with the same identity
    pub fn insert(&mut self, document: DocumentIndex) -> Option<DocumentIndex> {
        self.documents.insert(document.name.clone(), document)
    }

    pub fn get(&self, name: &str) -> Option<&DocumentIndex> {
        self.documents.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.documents.contains_key(name)
    }

    /// Drop a document; its cached embeddings stay on disk
    pub fn remove(&mut self, name: &str) -> Option<DocumentIndex> {
        self.documents.remove(name)
    }

    /// Identities of all stored documents, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.documents.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
