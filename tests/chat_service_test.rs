//! Chat turns over an indexed PDF with a scripted model

mod helpers;

use std::sync::Arc;

use tempfile::TempDir;

use helpers::{hash_indexer, hash_model, write_pdf, MockChatClient, StreamScript};
use pdfqa::domain::models::{Config, DocumentStore, Role, Session};
use pdfqa::services::{ChatOptions, ChatService, QueryRewriter, Retriever};

const PAGES: &[&str] = &[
    "Chapter 1: Light. Photosynthesis converts light to energy. Chlorophyll absorbs red and blue light.",
    "Chapter 2: Water. Roots absorb water from the soil. Water moves up through the stem.",
];

struct Fixture {
    _dir: TempDir,
    client: Arc<MockChatClient>,
    service: ChatService,
    store: DocumentStore,
    session: Session,
    options: ChatOptions,
}

async fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(dir.path(), "plants.pdf", Some("Plants"), PAGES);
    let document = hash_indexer(&dir.path().join("cache"), 12, 1)
        .index_pdf(&pdf, None)
        .await
        .unwrap();

    let mut store = DocumentStore::new();
    store.insert(document);
    let mut session = Session::new("Default");
    session.set_active_document("plants");

    let config = Config::default();
    let client = MockChatClient::shared();
    let service = ChatService::new(
        client.clone(),
        QueryRewriter::new(client.clone(), config.rewrite.clone()),
        Retriever::new(hash_model(), config.retrieval.max_top_k),
    );

    Fixture {
        _dir: dir,
        client,
        service,
        store,
        session,
        options: ChatOptions::from_config(&config),
    }
}

#[tokio::test]
async fn test_rag_turn_grounds_answer_in_context() {
    let mut f = fixture().await;
    f.client.push_tokens(&["It converts ", "light to energy."]);

    let mut streamed = Vec::new();
    let outcome = f
        .service
        .chat_turn(
            &mut f.session,
            &f.store,
            "What is photosynthesis?",
            &f.options,
            |token: &str| streamed.push(token.to_string()),
        )
        .await;

    assert!(!outcome.failed);
    assert_eq!(outcome.answer, "It converts light to energy.");
    assert_eq!(streamed, vec!["It converts ", "light to energy."]);
    assert!(!outcome.was_rewritten("What is photosynthesis?"));
    assert!(!outcome.results.is_empty());
    assert!(outcome.results.len() <= f.options.top_k);

    let context = outcome.context.unwrap();
    assert!(context.starts_with("CONTEXT FROM PDF DOCUMENT:"));

    let request = f.client.last_stream_request();
    assert_eq!(request.model, f.options.model);
    assert_eq!(request.max_tokens, f.options.max_tokens);
    assert_eq!(request.messages.len(), 2);
    assert_eq!(request.messages[0].role, "system");
    assert!(request.messages[0].content.contains("### Retrieved Context"));
    assert!(request.messages[0].content.contains(&context));
    assert_eq!(request.messages[1].content, "What is photosynthesis?");

    // First turn has nothing to rewrite against
    assert_eq!(f.client.completion_count(), 0);

    assert_eq!(f.session.history.len(), 2);
    assert_eq!(f.session.history[0].role, Role::User);
    assert_eq!(f.session.history[1].role, Role::Assistant);
    assert_eq!(f.session.history[1].content, "It converts light to energy.");
}

#[tokio::test]
async fn test_follow_up_uses_rewritten_query() {
    let mut f = fixture().await;
    f.client.push_tokens(&["It converts light to energy."]);
    f.service
        .chat_turn(&mut f.session, &f.store, "What is photosynthesis?", &f.options, |_: &str| {})
        .await;

    f.client.push_completion("How does photosynthesis work?");
    f.client.push_tokens(&["Chlorophyll absorbs light."]);
    let outcome = f
        .service
        .chat_turn(&mut f.session, &f.store, "How does it work?", &f.options, |_: &str| {})
        .await;

    assert_eq!(outcome.effective_query, "How does photosynthesis work?");
    assert!(outcome.was_rewritten("How does it work?"));
    assert_eq!(f.client.completion_count(), 1);

    let request = f.client.last_stream_request();
    let last = request.messages.last().unwrap();
    assert_eq!(last.role, "user");
    assert_eq!(last.content, "How does photosynthesis work?");
    assert!(request.messages.iter().all(|m| !m.content.starts_with("Note:")));

    // History keeps what the user actually typed
    assert_eq!(f.session.history[2].content, "How does it work?");
    assert_eq!(f.session.history.len(), 4);
}

#[tokio::test]
async fn test_rewriting_can_be_disabled() {
    let mut f = fixture().await;
    f.options.rewrite = false;
    f.client.push_tokens(&["First."]);
    f.client.push_tokens(&["Second."]);

    f.service
        .chat_turn(&mut f.session, &f.store, "What is photosynthesis?", &f.options, |_: &str| {})
        .await;
    let outcome = f
        .service
        .chat_turn(&mut f.session, &f.store, "How does it work?", &f.options, |_: &str| {})
        .await;

    assert_eq!(outcome.effective_query, "How does it work?");
    assert_eq!(f.client.completion_count(), 0);
    let request = f.client.last_stream_request();
    let contents: Vec<&str> = request.messages[1..].iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["What is photosynthesis?", "First.", "How does it work?"]);
}

#[tokio::test]
async fn test_without_active_document_uses_general_knowledge() {
    let mut f = fixture().await;
    f.session.active_document = None;
    f.client.push_tokens(&["Paris."]);

    let outcome = f
        .service
        .chat_turn(&mut f.session, &f.store, "What is the capital of France?", &f.options, |_: &str| {})
        .await;

    assert_eq!(outcome.answer, "Paris.");
    assert!(outcome.context.is_none());
    assert!(outcome.results.is_empty());
    let request = f.client.last_stream_request();
    assert!(request.messages[0]
        .content
        .contains("No PDF context is being used for this query."));
}

#[tokio::test]
async fn test_rag_disabled_skips_retrieval() {
    let mut f = fixture().await;
    f.options.use_rag = false;
    f.client.push_tokens(&["General answer."]);

    let outcome = f
        .service
        .chat_turn(&mut f.session, &f.store, "What is photosynthesis?", &f.options, |_: &str| {})
        .await;

    assert!(outcome.context.is_none());
    assert!(!f.client.last_stream_request().messages[0]
        .content
        .contains("### Retrieved Context"));
}

#[tokio::test]
async fn test_unknown_active_document_uses_general_knowledge() {
    let mut f = fixture().await;
    f.session.set_active_document("not-loaded");
    f.client.push_tokens(&["Answer."]);

    let outcome = f
        .service
        .chat_turn(&mut f.session, &f.store, "What is photosynthesis?", &f.options, |_: &str| {})
        .await;

    assert!(outcome.context.is_none());
    assert!(!outcome.failed);
}

#[tokio::test]
async fn test_empty_retrieval_reports_missing_context() {
    let mut f = fixture().await;
    let mut document = f.store.get("plants").unwrap().clone();
    document.model_id = "another-embedding-model".to_string();
    f.store.insert(document);
    f.client.push_tokens(&["Not covered."]);

    let outcome = f
        .service
        .chat_turn(&mut f.session, &f.store, "What is photosynthesis?", &f.options, |_: &str| {})
        .await;

    assert!(outcome.results.is_empty());
    assert_eq!(
        outcome.context.as_deref(),
        Some("No relevant information was found in the PDF for this query.")
    );
    assert!(f.client.last_stream_request().messages[0]
        .content
        .contains("No relevant information was found in the PDF for this query."));
}

#[tokio::test]
async fn test_generation_failure_becomes_apology() {
    let mut f = fixture().await;
    f.client.push_stream(StreamScript::Fails("connection refused".to_string()));

    let outcome = f
        .service
        .chat_turn(&mut f.session, &f.store, "What is photosynthesis?", &f.options, |_: &str| {})
        .await;

    assert!(outcome.failed);
    assert!(outcome
        .answer
        .starts_with("I'm sorry, but I encountered an error while generating a response."));
    assert!(outcome.answer.ends_with("Technical details: connection refused"));
    assert_eq!(f.session.history.len(), 2);
    assert_eq!(f.session.history[1].content, outcome.answer);
}

#[tokio::test]
async fn test_mid_stream_failure_keeps_delivered_tokens() {
    let mut f = fixture().await;
    f.client.push_stream(StreamScript::BreaksAfter(
        vec!["Photo".to_string(), "synthesis".to_string()],
        "stream reset".to_string(),
    ));

    let mut streamed = String::new();
    let outcome = f
        .service
        .chat_turn(
            &mut f.session,
            &f.store,
            "What is photosynthesis?",
            &f.options,
            |token: &str| streamed.push_str(token),
        )
        .await;

    assert_eq!(streamed, "Photosynthesis");
    assert!(outcome.failed);
    assert!(outcome.answer.contains("stream reset"));
}

#[tokio::test]
async fn test_history_is_limited() {
    let mut f = fixture().await;
    f.options.rewrite = false;
    f.options.history_limit = 3;
    for i in 0..3 {
        f.client.push_tokens(&["ok"]);
        f.service
            .chat_turn(&mut f.session, &f.store, &format!("question {i}"), &f.options, |_: &str| {})
            .await;
    }

    let request = f.client.last_stream_request();
    assert_eq!(request.messages.len(), 4);
    let contents: Vec<&str> = request.messages[1..].iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["question 1", "ok", "question 2"]);
}

#[tokio::test]
async fn test_config_defaults_drive_options() {
    let config = Config::default();
    let options = ChatOptions::from_config(&config);
    assert_eq!(options.model, config.llm.model);
    assert_eq!(options.top_k, config.retrieval.top_k);
    assert_eq!(options.history_limit, 5);
    assert!(options.use_rag);
}
