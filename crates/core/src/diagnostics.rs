use crate::config::Settings;
use crate::recommend::Recommender;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// Operator-facing view of configuration and catalog state. Read-only.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub env_path: Option<String>,
    pub env_exists: bool,
    pub token_length: usize,
    pub token_masked: String,
    pub last_clash_error: Option<String>,
    pub cards_cached: usize,
    pub catalog_fetched_at: DateTime<Utc>,
    pub auth_ok: bool,
    pub llm_provider: String,
    pub llm_model: Option<String>,
    pub has_openai_key: bool,
    pub has_groq_key: bool,
}

impl Diagnostics {
    pub fn collect(
        settings: &Settings,
        recommender: &Recommender,
        env_path: Option<&Path>,
    ) -> Self {
        let catalog = recommender.catalog();
        let token = settings.clash_api_key.as_deref().unwrap_or("");

        Self {
            env_path: env_path.map(|p| p.display().to_string()),
            env_exists: env_path.is_some_and(Path::exists),
            token_length: token.chars().count(),
            token_masked: mask_token(token),
            last_clash_error: catalog.last_error().map(str::to_string),
            cards_cached: catalog.len(),
            catalog_fetched_at: catalog.fetched_at(),
            auth_ok: !catalog.is_empty() && catalog.last_error().is_none(),
            llm_provider: settings.llm_provider.clone(),
            llm_model: recommender
                .llm()
                .as_ref()
                .ok()
                .map(|client| client.model().to_string()),
            has_openai_key: settings.openai_api_key.is_some(),
            has_groq_key: settings.groq_api_key.is_some(),
        }
    }
}

/// First six and last four characters of `token`; empty when there is no token.
pub fn mask_token(token: &str) -> String {
    if token.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = token.chars().collect();
    let head: String = chars.iter().take(6).collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{head}...{tail}")
}
