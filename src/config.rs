//! Runtime configuration for the pdf2audit service.
//!
//! Everything the service needs from its environment is read exactly once
//! at process start into an [`AppConfig`], then passed by reference into
//! the pieces that need it. No module reads ambient environment state at
//! request time, which is what makes the analysis client testable with a
//! fake configuration.

use crate::error::AuditError;
use reqwest::Url;
use secrecy::SecretString;
use std::path::PathBuf;

/// Environment variable names, kept from the original deployment so an
/// existing `.env` keeps working unchanged.
const ENV_API_KEY: &str = "AZURE_OPENAI_API_KEY";
const ENV_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
const ENV_API_VERSION: &str = "AZURE_OPENAI_API_VERSION";
const ENV_DEPLOYMENT: &str = "AZURE_OPENAI_DEPLOYMENT_NAME";
const ENV_REQUESTS_DIR: &str = "PDF2AUDIT_REQUESTS_DIR";
const ENV_RESULTS_DIR: &str = "PDF2AUDIT_RESULTS_DIR";

/// Configuration for the service, constructed at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Azure OpenAI API key. Held in a [`SecretString`] so it cannot leak
    /// through `Debug` output or log lines.
    pub api_key: SecretString,

    /// Azure OpenAI resource endpoint, e.g. `https://myresource.openai.azure.com`.
    pub endpoint: Url,

    /// Azure OpenAI REST API version. Default: `2023-05-15`.
    pub api_version: String,

    /// Name under which the model configuration is published on the
    /// provider; routes the chat-completion call.
    pub deployment: String,

    /// Flat directory holding uploaded PDF expense requests (read-only to
    /// this service). Default: `public/analise`.
    pub requests_dir: PathBuf,

    /// Flat directory receiving saved analysis text files. Default:
    /// `public/resultados`.
    pub results_dir: PathBuf,

    /// Sampling temperature for the completion call. Fixed at 0.7, the
    /// value the reference deployment shipped with; exposed as a field so
    /// tests can pin it.
    pub temperature: f32,

    /// Maximum tokens the model may generate per analysis. Fixed at 1000.
    pub max_tokens: u32,
}

impl AppConfig {
    /// Read the configuration from the environment.
    ///
    /// Fails with a message naming the missing variable; partial
    /// configuration never reaches the serving loop.
    pub fn from_env() -> Result<Self, AuditError> {
        let api_key = require_env(ENV_API_KEY)?;
        let endpoint_raw = require_env(ENV_ENDPOINT)?;
        let deployment = require_env(ENV_DEPLOYMENT)?;

        let endpoint = Url::parse(&endpoint_raw).map_err(|e| AuditError::Config {
            message: format!("{ENV_ENDPOINT} is not a valid URL ('{endpoint_raw}'): {e}"),
        })?;

        let api_version =
            std::env::var(ENV_API_VERSION).unwrap_or_else(|_| "2023-05-15".to_string());

        let requests_dir = std::env::var(ENV_REQUESTS_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("public/analise"));
        let results_dir = std::env::var(ENV_RESULTS_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("public/resultados"));

        Ok(Self {
            api_key: SecretString::from(api_key),
            endpoint,
            api_version,
            deployment,
            requests_dir,
            results_dir,
            temperature: 0.7,
            max_tokens: 1000,
        })
    }
}

fn require_env(name: &str) -> Result<String, AuditError> {
    match std::env::var(name) {
        Ok(v) if !v.is_empty() => Ok(v),
        _ => Err(AuditError::Config {
            message: format!("environment variable {name} is not set"),
        }),
    }
}
