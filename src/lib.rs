//! # pdf2audit
//!
//! Analyse PDF travel-expense requests ("pedidos de diária") for
//! regulatory compliance using an Azure OpenAI chat deployment — HTTP
//! service and library.
//!
//! ## Pipeline Overview
//!
//! ```text
//! POST /analyze {filename}
//!  │
//!  ├─ 1. Resolve   look the filename up in the request directory (404 if absent)
//!  ├─ 2. Extract   lopdf per-page text, concatenated in page order (spawn_blocking)
//!  ├─ 3. Prompt    regulatory rules block + document text → [system, user]
//!  ├─ 4. Complete  one chat-completion call, first choice, trimmed
//!  └─ 5. Respond   {"analysis": …}; the caller may POST /save to persist it
//! ```
//!
//! Every request is independent: no shared mutable state, no caching, no
//! retries. The remote model is behind the [`llm::ChatCompletion`]
//! capability trait so the whole surface can be tested with a canned
//! double.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2audit::{AppConfig, AppState, AzureOpenAi, CompletionOptions, DocumentStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credentials and endpoint from AZURE_OPENAI_* environment variables
//!     let config = AppConfig::from_env()?;
//!     let store = Arc::new(DocumentStore::new(
//!         &config.requests_dir,
//!         &config.results_dir,
//!     ));
//!     store.ensure_dirs().await?;
//!     let state = AppState {
//!         client: Arc::new(AzureOpenAi::new(&config)),
//!         options: CompletionOptions::from_config(&config),
//!         store,
//!     };
//!     pdf2audit::server::serve(
//!         pdf2audit::server::build_router(state),
//!         "0.0.0.0:8000".parse()?,
//!     )
//!     .await?;
//!     Ok(())
//! }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod llm;
pub mod prompts;
pub mod server;
pub mod storage;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::AppConfig;
pub use error::AuditError;
pub use llm::{AzureOpenAi, ChatCompletion, ChatMessage, ChatRole, CompletionOptions};
pub use server::{build_router, AppState};
pub use storage::DocumentStore;
