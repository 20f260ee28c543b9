//! Analysis Client: the chat-completion capability and its Azure OpenAI
//! implementation.
//!
//! The remote model is modelled as a capability with one operation —
//! send an ordered message sequence plus sampling options, get back the
//! first completion's text or a failure — so the HTTP surface can be
//! exercised against a canned double without a network dependency.
//!
//! There is deliberately no retry, no backoff, and no streaming here:
//! an analyze request makes exactly one outbound call and either returns
//! a complete analysis or an error.

use crate::config::AppConfig;
use crate::error::AuditError;
use async_trait::async_trait;
use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

// ── Message types ────────────────────────────────────────────────────────

/// Role tag of a chat message. The analysis pipeline only ever produces
/// the system/user pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

/// One role-tagged message of a chat-completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Sampling parameters for one completion call.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

// ── Capability trait ─────────────────────────────────────────────────────

/// The one remote capability this service depends on.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Send `messages` and return the text of the first completion choice,
    /// trimmed of leading/trailing whitespace.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String, AuditError>;
}

// ── Azure OpenAI implementation ──────────────────────────────────────────

/// Chat-completion client for an Azure OpenAI deployment.
pub struct AzureOpenAi {
    http: reqwest::Client,
    endpoint: Url,
    deployment: String,
    api_version: String,
    api_key: SecretString,
}

impl AzureOpenAi {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            deployment: config.deployment.clone(),
            api_version: config.api_version.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// `{endpoint}/openai/deployments/{deployment}/chat/completions?api-version={v}`
    fn chat_url(&self) -> Result<Url, AuditError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| AuditError::Completion {
                detail: format!("endpoint URL cannot be a base: {}", self.endpoint),
            })?
            .push("openai")
            .push("deployments")
            .push(&self.deployment)
            .push("chat")
            .push("completions");
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }
}

#[derive(Debug, Serialize)]
struct AzureChatRequest<'a> {
    messages: &'a [ChatMessage],
    max_tokens: u32,
    n: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct AzureChatResponse {
    choices: Vec<AzureChatChoice>,
}

#[derive(Debug, Deserialize)]
struct AzureChatChoice {
    message: AzureChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct AzureChatChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl ChatCompletion for AzureOpenAi {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String, AuditError> {
        let body = AzureChatRequest {
            messages,
            max_tokens: options.max_tokens,
            n: 1,
            stop: None,
            temperature: options.temperature,
        };

        let url = self.chat_url()?;
        let start = Instant::now();

        let response = self
            .http
            .post(url)
            .header("Content-Type", "application/json")
            .header("api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| AuditError::Completion {
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable error body>".to_string());
            return Err(AuditError::Completion {
                detail: format!("HTTP {status}: {detail}"),
            });
        }

        let parsed: AzureChatResponse =
            response.json().await.map_err(|e| AuditError::Completion {
                detail: format!("malformed completion response: {e}"),
            })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AuditError::Completion {
                detail: "response contained no completion choices".to_string(),
            })?;

        debug!(
            "completion returned {} chars in {:?}",
            content.len(),
            start.elapsed()
        );
        Ok(content.trim().to_string())
    }
}
