//! Server binary for pdf2audit.
//!
//! A thin shim over the library crate: parse flags, read the environment
//! configuration, wire the state, serve.

use anyhow::{Context, Result};
use clap::Parser;
use pdf2audit::{AppConfig, AppState, AzureOpenAi, CompletionOptions, DocumentStore};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Analyse PDF travel-expense requests for regulatory compliance"
)]
struct Args {
    /// Socket address to listen on.
    #[arg(long, default_value = "0.0.0.0:8000")]
    bind: SocketAddr,

    /// Override the request-document directory (default: $PDF2AUDIT_REQUESTS_DIR
    /// or public/analise).
    #[arg(long)]
    requests_dir: Option<PathBuf>,

    /// Override the saved-analysis directory (default: $PDF2AUDIT_RESULTS_DIR
    /// or public/resultados).
    #[arg(long)]
    results_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pdf2audit=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = AppConfig::from_env().context("loading configuration")?;
    if let Some(dir) = args.requests_dir {
        config.requests_dir = dir;
    }
    if let Some(dir) = args.results_dir {
        config.results_dir = dir;
    }

    tracing::info!(
        "deployment '{}' at {} (api-version {})",
        config.deployment,
        config.endpoint,
        config.api_version
    );
    tracing::info!(
        "requests: {} — results: {}",
        config.requests_dir.display(),
        config.results_dir.display()
    );

    let store = Arc::new(DocumentStore::new(
        &config.requests_dir,
        &config.results_dir,
    ));
    store.ensure_dirs().await.context("creating data directories")?;

    let state = AppState {
        client: Arc::new(AzureOpenAi::new(&config)),
        options: CompletionOptions::from_config(&config),
        store,
    };

    pdf2audit::server::serve(pdf2audit::build_router(state), args.bind)
        .await
        .context("serving")?;

    Ok(())
}
