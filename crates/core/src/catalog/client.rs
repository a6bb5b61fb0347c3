use crate::catalog::{CardRecord, CardsResponse};
use crate::config::Settings;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.clashroyale.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 20;

#[async_trait::async_trait]
pub trait CardSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    async fn fetch_cards(&self) -> Result<Vec<CardRecord>>;
}

/// Client for the Clash Royale developer API. A single attempt per call; no retries.
#[derive(Debug, Clone)]
pub struct ClashApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl ClashApiClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = std::env::var("CLASH_BASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = std::env::var("CLASH_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self::new(
            base_url,
            settings.clash_api_key.clone(),
            Duration::from_secs(timeout_secs),
        )
    }

    pub fn new(base_url: String, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build card API http client")?;

        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    fn url(&self) -> String {
        format!("{}/cards", self.base_url.trim_end_matches('/'))
    }

    fn headers(&self, api_key: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .context("CLASH_API_KEY contains invalid header characters")?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait::async_trait]
impl CardSource for ClashApiClient {
    fn source_name(&self) -> &'static str {
        "clash_royale_api"
    }

    async fn fetch_cards(&self) -> Result<Vec<CardRecord>> {
        let api_key = self
            .api_key
            .as_deref()
            .context("CLASH_API_KEY is not set")?;
        let headers = self.headers(api_key)?;

        let res = self
            .http
            .get(self.url())
            .headers(headers)
            .send()
            .await
            .context("card API request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read card API response")?;

        if !status.is_success() {
            anyhow::bail!("card API HTTP {status}: {text}");
        }

        let parsed = serde_json::from_str::<CardsResponse>(&text)
            .with_context(|| format!("card API response is not valid JSON: {text}"))?;
        Ok(parsed.items)
    }
}
