//! Shared fixtures for integration tests
//!
//! - `MockChatClient`: scripted `ChatClient` that records requests
//! - `pdf_bytes` / `write_pdf`: small PDFs built with lopdf
//! - `hash_indexer`: offline indexing pipeline on the hashing embedder

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};

use pdfqa::domain::models::{CacheKeyStrategy, ChunkingConfig};
use pdfqa::domain::ports::{ChatClient, ChatRequest, TokenStream};
use pdfqa::infrastructure::vector::{Chunker, Embedder, EmbeddingCache, HashEmbeddingModel};
use pdfqa::services::DocumentIndexer;

/// Scripted reply for one streamed generation
pub enum StreamScript {
    Tokens(Vec<String>),
    /// Tokens followed by an error item
    BreaksAfter(Vec<String>, String),
    /// Opening the stream fails
    Fails(String),
}

/// `ChatClient` replaying scripted replies in order
#[derive(Default)]
pub struct MockChatClient {
    completions: Mutex<VecDeque<Result<String, String>>>,
    streams: Mutex<VecDeque<StreamScript>>,
    pub completion_requests: Mutex<Vec<ChatRequest>>,
    pub stream_requests: Mutex<Vec<ChatRequest>>,
}

impl MockChatClient {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_completion(&self, reply: &str) {
        self.completions.lock().unwrap().push_back(Ok(reply.to_string()));
    }

    pub fn push_completion_error(&self, message: &str) {
        self.completions.lock().unwrap().push_back(Err(message.to_string()));
    }

    pub fn push_stream(&self, script: StreamScript) {
        self.streams.lock().unwrap().push_back(script);
    }

    pub fn push_tokens(&self, tokens: &[&str]) {
        self.push_stream(StreamScript::Tokens(tokens.iter().map(|t| (*t).to_string()).collect()));
    }

    pub fn completion_count(&self) -> usize {
        self.completion_requests.lock().unwrap().len()
    }

    pub fn last_stream_request(&self) -> ChatRequest {
        self.stream_requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no stream request recorded")
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn complete(&self, request: ChatRequest) -> Result<String> {
        self.completion_requests.lock().unwrap().push(request);
        match self.completions.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(anyhow!(message)),
            None => bail!("no scripted completion"),
        }
    }

    async fn stream(&self, request: ChatRequest) -> Result<TokenStream> {
        self.stream_requests.lock().unwrap().push(request);
        let script = self.streams.lock().unwrap().pop_front();

        let items: Vec<Result<String>> = match script {
            Some(StreamScript::Tokens(tokens)) => tokens.into_iter().map(Ok).collect(),
            Some(StreamScript::BreaksAfter(tokens, message)) => tokens
                .into_iter()
                .map(Ok)
                .chain(std::iter::once(Err(anyhow!(message))))
                .collect(),
            Some(StreamScript::Fails(message)) => bail!(message),
            None => bail!("no scripted stream"),
        };

        Ok(Box::pin(futures::stream::iter(items)))
    }
}

/// A PDF with one text line per page and optional Info metadata
pub fn pdf_bytes(title: Option<&str>, author: Option<&str>, pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![50.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode page content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let page_count = i64::try_from(kids.len()).expect("page count");
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut info = Dictionary::new();
    if let Some(title) = title {
        info.set("Title", Object::string_literal(title));
    }
    if let Some(author) = author {
        info.set("Author", Object::string_literal(author));
    }
    let info_id = doc.add_object(info);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("serialize PDF");
    bytes
}

/// Write a fixture PDF into `dir` and return its path
pub fn write_pdf(dir: &Path, file_name: &str, title: Option<&str>, pages: &[&str]) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, pdf_bytes(title, Some("Test Author"), pages)).expect("write PDF");
    path
}

pub const HASH_DIMENSIONS: usize = 64;

pub fn hash_model() -> Arc<HashEmbeddingModel> {
    Arc::new(HashEmbeddingModel::new(HASH_DIMENSIONS).expect("hash model"))
}

/// Indexing pipeline on the hashing embedder, caching into `cache_dir`
pub fn hash_indexer(cache_dir: &Path, chunk_size: usize, overlap: usize) -> DocumentIndexer {
    let embedder = Embedder::new(hash_model(), 8)
        .expect("embedder")
        .with_cache(EmbeddingCache::new(cache_dir.to_path_buf()));
    let chunker = Chunker::with_config(ChunkingConfig::new(chunk_size, overlap)).expect("chunker");
    DocumentIndexer::new(chunker, embedder, CacheKeyStrategy::DocumentName)
}
