use crate::llm::{post_json, LlmClient, Provider};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// OpenAI Responses API client.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn from_env(api_key: String, timeout: Duration) -> anyhow::Result<Self> {
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self::new(api_key, base_url, model, timeout)
    }

    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
        })
    }

    /// Concatenated `output_text` parts of every message item. Falls back to the raw body when the
    /// response has an unexpected shape, so the caller's JSON validation reports it.
    fn response_text(raw: &str) -> String {
        let Ok(res) = serde_json::from_str::<CreateResponseResponse>(raw) else {
            return raw.to_string();
        };

        let mut out = String::new();
        for item in &res.output {
            let OutputItem::Message { content } = item else {
                continue;
            };
            for part in content {
                if let ContentPart::OutputText { text } = part {
                    if !out.is_empty() {
                        out.push('\n');
                    }
                    out.push_str(text);
                }
            }
        }

        if out.is_empty() {
            raw.to_string()
        } else {
            out
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider(&self) -> Provider {
        Provider::OpenAI
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let url = format!("{}/responses", self.base_url.trim_end_matches('/'));
        let req = CreateResponseRequest {
            model: &self.model,
            input: prompt,
        };

        let raw = post_json(&self.http, Provider::OpenAI, &url, &self.api_key, &req).await?;
        Ok(Self::response_text(&raw))
    }
}

#[derive(Debug, Serialize)]
struct CreateResponseRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateResponseResponse {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum OutputItem {
    #[serde(rename = "message")]
    Message {
        #[serde(default)]
        content: Vec<ContentPart>,
    },

    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentPart {
    #[serde(rename = "output_text")]
    OutputText { text: String },

    #[serde(other)]
    Unknown,
}
