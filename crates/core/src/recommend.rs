use crate::catalog::CardCatalog;
use crate::domain::deck::{AiRecommendation, AiRequest, BaselineRequest, DeckCard, Recommendation};
use crate::domain::loadout::{self, Bracket, Style};
use crate::llm::error::LlmDiagnosticsError;
use crate::llm::prompt::{self, UserPreferences};
use crate::llm::{json, LlmBackend, LlmSetupError, Provider};
use std::sync::Arc;
use thiserror::Error;

const RAW_EXCERPT_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Cards not loaded from Clash API yet. Check /debug")]
    CatalogUnavailable,

    #[error("LLM_PROVIDER not set. Put LLM_PROVIDER=openai or LLM_PROVIDER=groq in .env to use AI endpoint.")]
    ProviderNotConfigured,

    #[error("{0} missing in .env")]
    MissingCredential(&'static str),

    #[error("{provider} error: {message}")]
    Upstream { provider: Provider, message: String },

    #[error("AI response was not valid JSON ({reason}). Raw: {excerpt}")]
    InvalidAiResponse { reason: String, excerpt: String },
}

impl RecommendError {
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RecommendError::InvalidRequest(_) | RecommendError::ProviderNotConfigured
        )
    }
}

/// Serves decks from the fixed table or the configured model, over one catalog snapshot.
pub struct Recommender {
    catalog: Arc<CardCatalog>,
    llm: LlmBackend,
}

impl Recommender {
    pub fn new(catalog: Arc<CardCatalog>, llm: LlmBackend) -> Self {
        Self { catalog, llm }
    }

    pub fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    pub fn llm(&self) -> &LlmBackend {
        &self.llm
    }

    pub fn recommend(&self, req: &BaselineRequest) -> Result<Recommendation, RecommendError> {
        let (bracket, style) = parse_selection(&req.bracket, &req.style)?;
        let deck = self.resolve_deck(loadout::loadout(bracket, style).iter().copied());
        tracing::debug!(%bracket, %style, "baseline deck served");
        Ok(Recommendation { deck })
    }

    pub async fn recommend_ai(&self, req: &AiRequest) -> Result<AiRecommendation, RecommendError> {
        if self.catalog.is_empty() {
            return Err(RecommendError::CatalogUnavailable);
        }
        let (bracket, style) = parse_selection(&req.bracket, &req.style)?;

        let client = match &self.llm {
            Ok(client) => client,
            Err(LlmSetupError::NotSelected) => return Err(RecommendError::ProviderNotConfigured),
            Err(LlmSetupError::MissingKey(provider)) => {
                return Err(RecommendError::MissingCredential(provider.key_env()))
            }
        };

        let prefs = UserPreferences {
            bracket: bracket.label(),
            style: style.label(),
            favorite_card: req.favorite_card.as_deref(),
            hate_card: req.hate_card.as_deref(),
            notes: req.notes.as_deref(),
        };
        let prompt = prompt::deck_prompt(&self.catalog.valid_names(), &prefs);

        let provider = client.provider();
        let raw = client.complete(&prompt).await.map_err(|err| {
            tracing::warn!(%provider, error = %format!("{err:#}"), "LLM call failed");
            upstream_error(provider, err)
        })?;

        let contract = json::parse_deck(&raw).map_err(|err| {
            tracing::warn!(%provider, error = %format!("{err:#}"), "LLM output rejected");
            RecommendError::InvalidAiResponse {
                reason: format!("{err:#}"),
                excerpt: json::excerpt(&raw, RAW_EXCERPT_CHARS),
            }
        })?;

        let deck = self.resolve_deck(contract.deck.iter().map(String::as_str));
        tracing::info!(%provider, %bracket, %style, "AI deck served");

        Ok(AiRecommendation {
            deck,
            insights: contract.insights,
            playstyle_tips: contract.playstyle_tips,
            weaknesses: contract.weaknesses,
        })
    }

    fn resolve_deck<'a>(&self, names: impl Iterator<Item = &'a str>) -> Vec<DeckCard> {
        names
            .map(|name| DeckCard {
                name: name.to_string(),
                image: self.catalog.icon_for(name).to_string(),
            })
            .collect()
    }
}

fn parse_selection(bracket: &str, style: &str) -> Result<(Bracket, Style), RecommendError> {
    let bracket = Bracket::parse(bracket).ok_or_else(|| {
        RecommendError::InvalidRequest(format!("Invalid bracket. Use: {:?}", Bracket::labels()))
    })?;
    let style = Style::parse(style).ok_or_else(|| {
        RecommendError::InvalidRequest(format!("Invalid style. Use: {:?}", Style::labels()))
    })?;
    Ok((bracket, style))
}

fn upstream_error(provider: Provider, err: anyhow::Error) -> RecommendError {
    let message = match err.downcast_ref::<LlmDiagnosticsError>() {
        Some(diag) => diag
            .raw_output
            .clone()
            .unwrap_or_else(|| diag.detail.clone()),
        None => format!("{err:#}"),
    };
    RecommendError::Upstream { provider, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CardRecord, IconUrls};
    use crate::llm::LlmClient;
    use serde_json::json;
    use std::sync::Mutex;

    struct ScriptedLlm {
        reply: String,
        failure: Mutex<Option<anyhow::Error>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedLlm {
        fn replying(text: impl Into<String>) -> Arc<Self> {
            Arc::new(Self {
                reply: text.into(),
                failure: Mutex::new(None),
                prompts: Mutex::new(Vec::new()),
            })
        }

        /// Fails the first call with `err` itself, so downcasts still see its concrete type.
        fn failing(err: anyhow::Error) -> Arc<Self> {
            Arc::new(Self {
                reply: String::new(),
                failure: Mutex::new(Some(err)),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for ScriptedLlm {
        fn provider(&self) -> Provider {
            Provider::Groq
        }

        fn model(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match self.failure.lock().unwrap().take() {
                Some(err) => Err(err),
                None => Ok(self.reply.clone()),
            }
        }
    }

    fn card(name: &str) -> CardRecord {
        CardRecord {
            name: name.to_string(),
            icon_urls: Some(IconUrls {
                medium: Some(format!("https://cdn/{}.png", name.to_lowercase())),
            }),
            ..Default::default()
        }
    }

    fn catalog() -> Arc<CardCatalog> {
        Arc::new(CardCatalog::from_records(
            ["Knight", "Hog Rider", "Zap", "Valkyrie", "Arrows", "Musketeer", "Miner", "Balloon"]
                .into_iter()
                .map(card)
                .collect(),
        ))
    }

    fn with_llm(catalog: Arc<CardCatalog>, llm: Arc<ScriptedLlm>) -> Recommender {
        let llm: Arc<dyn LlmClient> = llm;
        Recommender::new(catalog, Ok(llm))
    }

    fn baseline(bracket: &str, style: &str) -> BaselineRequest {
        BaselineRequest {
            bracket: bracket.to_string(),
            style: style.to_string(),
        }
    }

    fn ai(bracket: &str, style: &str) -> AiRequest {
        AiRequest {
            bracket: bracket.to_string(),
            style: style.to_string(),
            favorite_card: Some("Miner".to_string()),
            hate_card: None,
            notes: Some("struggle vs air".to_string()),
        }
    }

    fn ai_reply(cards: &[&str]) -> String {
        json!({
            "deck": cards,
            "insights": ["Pressure the opposite lane"],
            "playstyle_tips": ["Cycle Hog", "Save Zap for swarms"],
            "weaknesses": ["Heavy air"],
        })
        .to_string()
    }

    const EIGHT: [&str; 8] = [
        "Hog Rider", "knight", "Zap", "Valkyrie", "Arrows", "Musketeer", "Miner", "Ice Spirit",
    ];

    #[test]
    fn every_table_entry_returns_eight_named_cards() {
        let rec = Recommender::new(catalog(), Err(LlmSetupError::NotSelected));
        for bracket in Bracket::ALL {
            for style in Style::ALL {
                let out = rec.recommend(&baseline(bracket.label(), style.label())).unwrap();
                let names: Vec<_> = out.deck.iter().map(|c| c.name.as_str()).collect();
                assert_eq!(names.as_slice(), loadout::loadout(bracket, style).as_slice());
            }
        }
    }

    #[test]
    fn under_2000_attack_example() {
        let rec = Recommender::new(catalog(), Err(LlmSetupError::NotSelected));
        let out = rec.recommend(&baseline("<2000", "ATTACK")).unwrap();
        let names: Vec<_> = out.deck.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Hog Rider",
                "Knight",
                "Fire Spirits",
                "Zap",
                "Valkyrie",
                "Skeleton Army",
                "Arrows",
                "Musketeer"
            ]
        );
        assert_eq!(out.deck[0].image, "https://cdn/hog rider.png");
        assert_eq!(out.deck[2].image, "");
    }

    #[test]
    fn invalid_bracket_lists_valid_brackets() {
        let rec = Recommender::new(catalog(), Err(LlmSetupError::NotSelected));
        let err = rec.recommend(&baseline("9999", "attack")).unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(
            err.to_string(),
            r#"Invalid bracket. Use: ["<2000", "2000-4000", "4000-6000", ">6000"]"#
        );
    }

    #[test]
    fn invalid_style_lists_valid_styles() {
        let rec = Recommender::new(catalog(), Err(LlmSetupError::NotSelected));
        let err = rec.recommend(&baseline(">6000", "turtle")).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"Invalid style. Use: ["attack", "defense", "balance"]"#
        );
    }

    #[test]
    fn empty_catalog_still_serves_baseline_without_icons() {
        let rec = Recommender::new(
            Arc::new(CardCatalog::failed("offline")),
            Err(LlmSetupError::NotSelected),
        );
        let out = rec.recommend(&baseline("2000-4000", "balance")).unwrap();
        assert_eq!(out.deck.len(), 8);
        assert!(out.deck.iter().all(|c| c.image.is_empty()));
    }

    #[tokio::test]
    async fn ai_requires_loaded_catalog_regardless_of_input() {
        let llm = ScriptedLlm::replying(ai_reply(&EIGHT));
        let rec = with_llm(Arc::new(CardCatalog::failed("offline")), llm.clone());

        for (bracket, style) in [("<2000", "attack"), ("9999", "nope")] {
            let err = rec.recommend_ai(&ai(bracket, style)).await.unwrap_err();
            assert!(matches!(err, RecommendError::CatalogUnavailable));
        }
        assert!(llm.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn ai_rejects_unknown_bracket() {
        let rec = with_llm(catalog(), ScriptedLlm::replying(ai_reply(&EIGHT)));
        let err = rec.recommend_ai(&ai("9999", "attack")).await.unwrap_err();
        assert!(matches!(err, RecommendError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn ai_reports_setup_problems() {
        let rec = Recommender::new(catalog(), Err(LlmSetupError::NotSelected));
        let err = rec.recommend_ai(&ai("<2000", "attack")).await.unwrap_err();
        assert!(matches!(err, RecommendError::ProviderNotConfigured));

        let rec = Recommender::new(catalog(), Err(LlmSetupError::MissingKey(Provider::OpenAI)));
        let err = rec.recommend_ai(&ai("<2000", "attack")).await.unwrap_err();
        assert_eq!(err.to_string(), "OPENAI_API_KEY missing in .env");
        assert!(!err.is_client_error());
    }

    #[tokio::test]
    async fn ai_resolves_icons_and_echoes_notes() {
        let llm = ScriptedLlm::replying(ai_reply(&EIGHT));
        let rec = with_llm(catalog(), llm.clone());

        let out = rec.recommend_ai(&ai("4000-6000", "attack")).await.unwrap();
        assert_eq!(out.deck.len(), 8);
        assert_eq!(out.deck[1].name, "knight");
        assert_eq!(out.deck[1].image, "https://cdn/knight.png");
        assert_eq!(out.deck[7].image, "");
        assert_eq!(out.insights, vec!["Pressure the opposite lane"]);
        assert_eq!(out.playstyle_tips, vec!["Cycle Hog", "Save Zap for swarms"]);
        assert_eq!(out.weaknesses, vec!["Heavy air"]);

        let prompts = llm.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("\"Balloon\""));
        assert!(prompts[0].contains("struggle vs air"));
    }

    #[tokio::test]
    async fn ai_rejects_seven_or_nine_cards_with_excerpt() {
        for n in [7, 9] {
            let mut cards: Vec<&str> = EIGHT.to_vec();
            cards.resize(n, "Zap");
            let rec = with_llm(catalog(), ScriptedLlm::replying(ai_reply(&cards)));

            let err = rec.recommend_ai(&ai("<2000", "defense")).await.unwrap_err();
            let RecommendError::InvalidAiResponse { excerpt, .. } = &err else {
                panic!("unexpected error: {err}");
            };
            assert!(excerpt.contains("\"deck\""));
        }
    }

    #[tokio::test]
    async fn ai_excerpt_is_truncated() {
        let raw = "x".repeat(2_000);
        let rec = with_llm(catalog(), ScriptedLlm::replying(raw));
        let err = rec.recommend_ai(&ai("<2000", "balance")).await.unwrap_err();
        let RecommendError::InvalidAiResponse { excerpt, .. } = err else {
            panic!("expected InvalidAiResponse");
        };
        assert_eq!(excerpt.chars().count(), RAW_EXCERPT_CHARS);
    }

    #[tokio::test]
    async fn ai_surfaces_provider_body() {
        let diag = LlmDiagnosticsError {
            provider: Provider::Groq,
            stage: "http",
            detail: "status=429 Too Many Requests".to_string(),
            raw_output: Some("rate limited".to_string()),
        };
        let rec = with_llm(catalog(), ScriptedLlm::failing(diag.into()));
        let err = rec.recommend_ai(&ai("<2000", "attack")).await.unwrap_err();
        assert!(matches!(err, RecommendError::Upstream { provider: Provider::Groq, .. }));
        assert_eq!(err.to_string(), "Groq error: rate limited");
    }

    #[tokio::test]
    async fn ai_falls_back_to_error_chain_without_provider_body() {
        let err = anyhow::anyhow!("connection reset").context("Groq request failed");
        let rec = with_llm(catalog(), ScriptedLlm::failing(err));
        let err = rec.recommend_ai(&ai("<2000", "attack")).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Groq error: Groq request failed: connection reset"
        );
    }

    #[test]
    fn upstream_error_prefers_raw_provider_body() {
        let diag = LlmDiagnosticsError {
            provider: Provider::OpenAI,
            stage: "http",
            detail: "status=401 Unauthorized".to_string(),
            raw_output: Some(r#"{"error":"invalid_api_key"}"#.to_string()),
        };
        let err = upstream_error(Provider::OpenAI, diag.into());
        assert_eq!(err.to_string(), r#"OpenAI error: {"error":"invalid_api_key"}"#);
    }
}
