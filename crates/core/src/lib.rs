pub mod catalog;
pub mod diagnostics;
pub mod domain;
pub mod llm;
pub mod recommend;

pub mod config {
    use anyhow::Context;

    const DEFAULT_LLM_PROVIDER: &str = "none";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub clash_api_key: Option<String>,
        pub llm_provider: String,
        pub openai_api_key: Option<String>,
        pub groq_api_key: Option<String>,
        pub sentry_dsn: Option<String>,
        pub static_dir: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                clash_api_key: std::env::var("CLASH_API_KEY")
                    .ok()
                    .and_then(|v| normalize_api_key(&v)),
                llm_provider: std::env::var("LLM_PROVIDER")
                    .ok()
                    .map(|v| v.trim().to_lowercase())
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| DEFAULT_LLM_PROVIDER.to_string()),
                openai_api_key: non_empty_env("OPENAI_API_KEY"),
                groq_api_key: non_empty_env("GROQ_API_KEY"),
                sentry_dsn: non_empty_env("SENTRY_DSN"),
                static_dir: non_empty_env("STATIC_DIR"),
            })
        }

        pub fn require_openai_api_key(&self) -> anyhow::Result<&str> {
            self.openai_api_key
                .as_deref()
                .context("OPENAI_API_KEY missing")
        }

        pub fn require_groq_api_key(&self) -> anyhow::Result<&str> {
            self.groq_api_key.as_deref().context("GROQ_API_KEY missing")
        }
    }

    fn non_empty_env(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Strips surrounding quotes and an optional `Bearer ` prefix, as keys are often pasted
    /// straight from the developer portal into `.env`.
    pub fn normalize_api_key(raw: &str) -> Option<String> {
        let mut key = raw.trim().trim_matches('"').trim_matches('\'').trim();
        if let Some(prefix) = key.get(..7) {
            if prefix.eq_ignore_ascii_case("bearer ") {
                key = key[7..].trim();
            }
        }
        (!key.is_empty()).then(|| key.to_string())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn normalize_strips_quotes_and_bearer_prefix() {
            assert_eq!(normalize_api_key("abc123").as_deref(), Some("abc123"));
            assert_eq!(normalize_api_key(" \"abc123\" ").as_deref(), Some("abc123"));
            assert_eq!(normalize_api_key("'abc123'").as_deref(), Some("abc123"));
            assert_eq!(normalize_api_key("Bearer abc123").as_deref(), Some("abc123"));
            assert_eq!(normalize_api_key("\"bearer  abc123\"").as_deref(), Some("abc123"));
        }

        #[test]
        fn normalize_treats_blank_as_absent() {
            assert_eq!(normalize_api_key(""), None);
            assert_eq!(normalize_api_key("  \"\" "), None);
        }
    }
}
