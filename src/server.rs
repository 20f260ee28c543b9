//! HTTP Surface: the axum router and its four request handlers.
//!
//! Every handler is independent and fully synchronous from the caller's
//! perspective: resolve input, run the pipeline, respond. There is no
//! shared mutable state between requests — [`AppState`] is read-only
//! wiring (store, analysis client, sampling options) constructed once at
//! startup and cloned cheaply per request.

use crate::error::AuditError;
use crate::extract;
use crate::llm::{ChatCompletion, CompletionOptions};
use crate::prompts;
use crate::storage::DocumentStore;
use axum::extract::State;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Landing page, embedded so the binary is self-contained.
const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Read-only per-process wiring shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DocumentStore>,
    pub client: Arc<dyn ChatCompletion>,
    pub options: CompletionOptions,
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    pub filename: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub message: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────

pub async fn home() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// List the request documents available for analysis.
pub async fn list_files(State(state): State<AppState>) -> Result<Json<Vec<String>>, AuditError> {
    let names = state.store.list().await?;
    Ok(Json(names))
}

/// Run the full pipeline for one named request document:
/// resolve → extract text → build prompt → chat completion.
pub async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AuditError> {
    // Existence check first: a missing document must never trigger a
    // remote call.
    let path = state.store.resolve_request(&req.filename)?;
    info!("analyzing '{}'", req.filename);

    let document_text = extract::extract_text(&path).await?;
    let messages = prompts::build_messages(&document_text);
    let analysis = state.client.complete(&messages, &state.options).await?;

    Ok(Json(AnalyzeResponse { analysis }))
}

/// Persist caller-supplied analysis text under a chosen filename,
/// overwriting any previous file with that name.
pub async fn save(
    State(state): State<AppState>,
    Json(req): Json<SaveRequest>,
) -> Result<Json<SaveResponse>, AuditError> {
    state.store.save(&req.filename, &req.content).await?;
    Ok(Json(SaveResponse {
        message: "Analysis saved successfully".to_string(),
    }))
}

// ── Router / serving ─────────────────────────────────────────────────────

/// Build the application router.
///
/// The `/public/...` mounts expose the two data directories for direct
/// download, mirroring the static mount of the reference deployment.
pub fn build_router(state: AppState) -> Router {
    let serve_requests = ServeDir::new(state.store.requests_dir());
    let serve_results = ServeDir::new(state.store.results_dir());

    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/files", get(list_files))
        .route("/analyze", post(analyze))
        .route("/save", post(save))
        .nest_service("/public/analise", serve_requests)
        .nest_service("/public/resultados", serve_results)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until ctrl-c / SIGTERM.
pub async fn serve(router: Router, bind_address: SocketAddr) -> Result<(), AuditError> {
    let listener = match tokio::net::TcpListener::bind(bind_address).await {
        Ok(listener) => listener,
        Err(e) if e.kind() == ErrorKind::AddrInUse => {
            return Err(AuditError::Config {
                message: format!(
                    "failed to bind {bind_address}: {e}. \
                     Ensure no other process is using port {} or pass --bind",
                    bind_address.port()
                ),
            });
        }
        Err(e) => {
            return Err(AuditError::Config {
                message: format!("failed to bind {bind_address}: {e}"),
            });
        }
    };

    let actual = listener.local_addr().map_err(|e| AuditError::Config {
        message: format!("failed to read bound address: {e}"),
    })?;
    info!("pdf2audit is listening on {actual}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AuditError::Config {
            message: format!("server error: {e}"),
        })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received ctrl-c, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_reports_ok() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn landing_page_is_embedded() {
        assert!(INDEX_HTML.contains("<html"));
    }
}
