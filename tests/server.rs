//! Handler-level tests for the HTTP surface.
//!
//! The remote model is replaced by in-process doubles implementing
//! [`ChatCompletion`], and the data directories are tempdirs, so the full
//! analyze/save pipeline runs without any network or fixture downloads.

use async_trait::async_trait;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use pdf2audit::server::{analyze, list_files, save, AnalyzeRequest, SaveRequest};
use pdf2audit::{AppState, AuditError, ChatCompletion, ChatMessage, ChatRole, CompletionOptions};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── Doubles ──────────────────────────────────────────────────────────────

/// Returns a canned analysis and records every prompt it was sent.
struct RecordingClient {
    reply: String,
    calls: AtomicUsize,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl RecordingClient {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ChatCompletion for RecordingClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        _options: &CompletionOptions,
    ) -> Result<String, AuditError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(messages.to_vec());
        Ok(self.reply.clone())
    }
}

/// Fails every call the way a dead provider would.
struct FailingClient;

#[async_trait]
impl ChatCompletion for FailingClient {
    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _options: &CompletionOptions,
    ) -> Result<String, AuditError> {
        Err(AuditError::Completion {
            detail: "connection refused".to_string(),
        })
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────

fn test_options() -> CompletionOptions {
    CompletionOptions {
        temperature: 0.7,
        max_tokens: 1000,
    }
}

fn state_with(dir: &tempfile::TempDir, client: Arc<dyn ChatCompletion>) -> AppState {
    AppState {
        store: Arc::new(pdf2audit::DocumentStore::new(
            dir.path().join("analise"),
            dir.path().join("resultados"),
        )),
        client,
        options: test_options(),
    }
}

async fn ensure_dirs(state: &AppState) {
    state.store.ensure_dirs().await.unwrap();
}

/// Author a one-page PDF whose only content is `text`, using lopdf's
/// document-building API so the fixture is a genuinely valid PDF.
fn write_pdf(path: &Path, text: &str) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().unwrap(),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

// ── Tests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn listing_includes_an_uploaded_request_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_with(&dir, RecordingClient::new("ok"));
    ensure_dirs(&state).await;

    write_pdf(
        &state.store.requests_dir().join("request_123.pdf"),
        "Viagem a Belém, 3 diárias.",
    );

    let Json(names) = list_files(State(state)).await.unwrap();
    assert_eq!(
        names
            .iter()
            .filter(|n| n.as_str() == "request_123.pdf")
            .count(),
        1
    );
}

#[tokio::test]
async fn analyze_unknown_file_is_404_and_makes_no_remote_call() {
    let dir = tempfile::tempdir().unwrap();
    let client = RecordingClient::new("should never be returned");
    let state = state_with(&dir, client.clone());
    ensure_dirs(&state).await;

    let err = analyze(
        State(state),
        Json(AnalyzeRequest {
            filename: "missing.pdf".to_string(),
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn analyze_returns_the_model_reply() {
    let dir = tempfile::tempdir().unwrap();
    let client = RecordingClient::new("Pedido em conformidade com a Portaria nº 3196/2025.");
    let state = state_with(&dir, client.clone());
    ensure_dirs(&state).await;

    write_pdf(
        &state.store.requests_dir().join("request_123.pdf"),
        "Viagem a Belem, 3 diarias.",
    );

    let Json(resp) = analyze(
        State(state),
        Json(AnalyzeRequest {
            filename: "request_123.pdf".to_string(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(
        resp.analysis,
        "Pedido em conformidade com a Portaria nº 3196/2025."
    );
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn analyze_sends_exactly_two_messages_embedding_the_document_text() {
    let dir = tempfile::tempdir().unwrap();
    let client = RecordingClient::new("ok");
    let state = state_with(&dir, client.clone());
    ensure_dirs(&state).await;

    // ASCII text so the Courier fixture round-trips byte-for-byte.
    let document_text = "Viagem a Santarem, pernoite em 2 noites.";
    write_pdf(
        &state.store.requests_dir().join("pedido.pdf"),
        document_text,
    );

    analyze(
        State(state),
        Json(AnalyzeRequest {
            filename: "pedido.pdf".to_string(),
        }),
    )
    .await
    .unwrap();

    let seen = client.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let messages = &seen[0];
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, ChatRole::System);
    assert_eq!(messages[1].role, ChatRole::User);
    assert!(messages[0].content.contains(document_text));
    assert!(messages[1].content.contains(document_text));
}

#[tokio::test]
async fn analyze_failure_is_500_and_leaves_the_filesystem_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_with(&dir, Arc::new(FailingClient));
    ensure_dirs(&state).await;

    write_pdf(
        &state.store.requests_dir().join("pedido.pdf"),
        "Viagem a Maraba.",
    );

    let err = analyze(
        State(state.clone()),
        Json(AnalyzeRequest {
            filename: "pedido.pdf".to_string(),
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(err.to_string().contains("connection refused"));

    // No partial save happened as a side effect of analyze.
    let results: Vec<_> = std::fs::read_dir(state.store.results_dir())
        .unwrap()
        .collect();
    assert!(results.is_empty());
}

#[tokio::test]
async fn save_then_direct_read_returns_exactly_the_saved_content() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_with(&dir, RecordingClient::new("ok"));
    ensure_dirs(&state).await;

    let Json(resp) = save(
        State(state.clone()),
        Json(SaveRequest {
            filename: "result.txt".to_string(),
            content: "OK".to_string(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(resp.message, "Analysis saved successfully");
    let on_disk =
        std::fs::read_to_string(state.store.results_dir().join("result.txt")).unwrap();
    assert_eq!(on_disk, "OK");
}

#[tokio::test]
async fn save_rejects_path_traversal() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_with(&dir, RecordingClient::new("ok"));
    ensure_dirs(&state).await;

    let err = save(
        State(state),
        Json(SaveRequest {
            filename: "../escape.txt".to_string(),
            content: "x".to_string(),
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert!(!dir.path().join("escape.txt").exists());
}
