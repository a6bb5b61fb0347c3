pub mod error;
pub mod groq;
pub mod json;
pub mod openai;
pub mod prompt;

use crate::config::Settings;
use crate::llm::error::LlmDiagnosticsError;
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Groq,
}

impl Provider {
    /// Maps the `LLM_PROVIDER` setting. Anything other than `openai` or `groq` disables the AI
    /// endpoint.
    pub fn from_setting(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "openai" => Some(Provider::OpenAI),
            "groq" => Some(Provider::Groq),
            _ => None,
        }
    }

    pub fn key_env(self) -> &'static str {
        match self {
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::Groq => "GROQ_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::OpenAI => f.write_str("OpenAI"),
            Provider::Groq => f.write_str("Groq"),
        }
    }
}

/// Sends a single prompt and returns the model's text, normalized across provider APIs.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    fn provider(&self) -> Provider;

    fn model(&self) -> &str;

    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Why no client could be built from the current settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmSetupError {
    NotSelected,
    MissingKey(Provider),
}

pub type LlmBackend = Result<Arc<dyn LlmClient>, LlmSetupError>;

/// Picks the provider named by `LLM_PROVIDER`. Setup problems are kept rather than raised so the
/// server still starts and reports them per request.
pub fn backend_from_settings(settings: &Settings) -> anyhow::Result<LlmBackend> {
    let Some(provider) = Provider::from_setting(&settings.llm_provider) else {
        return Ok(Err(LlmSetupError::NotSelected));
    };

    let timeout = Duration::from_secs(
        std::env::var("LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS),
    );

    let client: Arc<dyn LlmClient> = match provider {
        Provider::OpenAI => {
            let Ok(key) = settings.require_openai_api_key() else {
                return Ok(Err(LlmSetupError::MissingKey(provider)));
            };
            Arc::new(openai::OpenAiClient::from_env(key.to_string(), timeout)?)
        }
        Provider::Groq => {
            let Ok(key) = settings.require_groq_api_key() else {
                return Ok(Err(LlmSetupError::MissingKey(provider)));
            };
            Arc::new(groq::GroqClient::from_env(key.to_string(), timeout)?)
        }
    };

    tracing::info!(%provider, "LLM backend configured");
    Ok(Ok(client))
}

/// POSTs `body` with bearer auth and returns the response text. Non-2xx responses become an
/// `LlmDiagnosticsError` carrying the provider's body.
pub(crate) async fn post_json<B: Serialize + ?Sized>(
    http: &reqwest::Client,
    provider: Provider,
    url: &str,
    api_key: &str,
    body: &B,
) -> anyhow::Result<String> {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {api_key}"))
            .with_context(|| format!("{} contains invalid header characters", provider.key_env()))?,
    );

    let res = http
        .post(url)
        .headers(headers)
        .json(body)
        .send()
        .await
        .with_context(|| format!("{provider} request failed"))?;

    let status = res.status();
    let text = res
        .text()
        .await
        .with_context(|| format!("failed to read {provider} response body"))?;

    if status.is_client_error() || status.is_server_error() {
        return Err(LlmDiagnosticsError {
            provider,
            stage: "http",
            detail: format!("status={status}"),
            raw_output: Some(text),
        }
        .into());
    }

    Ok(text)
}
