//! Error types for the pdf2audit library.
//!
//! A single [`AuditError`] enum covers every failure the service can
//! surface. Each variant carries enough context to render a useful HTTP
//! error body, and the enum knows its own status mapping so handlers can
//! simply return `Result<Json<T>, AuditError>` and let axum do the rest.
//!
//! The mapping follows the original service contract: a missing request
//! document is 404, a rejected filename is 400, and everything downstream
//! of the existence check (extraction, the remote model call, file I/O)
//! is a 500 carrying the failure description in a `{"detail": …}` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2audit library.
#[derive(Debug, Error)]
pub enum AuditError {
    // ── Request errors ────────────────────────────────────────────────────
    /// The named request document does not exist in the input directory.
    #[error("File not found")]
    DocumentNotFound { name: String },

    /// The caller-supplied filename contains a path separator, `..`, or is
    /// otherwise unusable as a flat key.
    #[error("Invalid filename: '{name}'")]
    InvalidFilename { name: String },

    // ── Pipeline errors ───────────────────────────────────────────────────
    /// The PDF exists but its text could not be extracted.
    #[error("Failed to extract text from '{name}': {detail}")]
    Extraction { name: String, detail: String },

    /// The chat-completion call failed (transport, auth, or provider-side).
    #[error("Erro ao analisar o pedido: {detail}")]
    Completion { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// A directory listing or file write failed.
    #[error("Storage operation failed on '{path}': {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Startup configuration is missing or malformed. Never reaches a
    /// request handler; the process refuses to start instead.
    #[error("Invalid configuration: {message}")]
    Config { message: String },
}

impl AuditError {
    /// HTTP status this error maps to when it escapes a handler.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuditError::DocumentNotFound { .. } => StatusCode::NOT_FOUND,
            AuditError::InvalidFilename { .. } => StatusCode::BAD_REQUEST,
            AuditError::Extraction { .. }
            | AuditError::Completion { .. }
            | AuditError::Storage { .. }
            | AuditError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuditError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {self}");
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
