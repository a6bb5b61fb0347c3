pub mod client;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

pub use client::{CardSource, ClashApiClient};

#[derive(Debug, Clone, Deserialize)]
pub struct CardsResponse {
    #[serde(default)]
    pub items: Vec<CardRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub max_level: Option<u32>,
    #[serde(default)]
    pub elixir_cost: Option<u32>,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub icon_urls: Option<IconUrls>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconUrls {
    #[serde(default)]
    pub medium: Option<String>,
}

impl CardRecord {
    pub fn medium_icon(&self) -> &str {
        self.icon_urls
            .as_ref()
            .and_then(|urls| urls.medium.as_deref())
            .unwrap_or("")
    }
}

/// Card data fetched once at startup. Never mutated afterwards.
#[derive(Debug, Clone)]
pub struct CardCatalog {
    cards: Vec<CardRecord>,
    // lowercased name -> index into `cards`, first occurrence wins.
    by_name: HashMap<String, usize>,
    last_error: Option<String>,
    fetched_at: DateTime<Utc>,
}

impl CardCatalog {
    pub fn from_records(cards: Vec<CardRecord>) -> Self {
        let mut by_name = HashMap::with_capacity(cards.len());
        for (idx, card) in cards.iter().enumerate() {
            by_name.entry(name_key(&card.name)).or_insert(idx);
        }
        Self {
            cards,
            by_name,
            last_error: None,
            fetched_at: Utc::now(),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            last_error: Some(error.into()),
            ..Self::from_records(Vec::new())
        }
    }

    /// Fetches the catalog from `source`. Failures degrade to an empty catalog that remembers the
    /// error; this never returns an error.
    pub async fn load(source: &dyn CardSource) -> Self {
        match source.fetch_cards().await {
            Ok(cards) => {
                tracing::info!(
                    source = source.source_name(),
                    cards = cards.len(),
                    "card catalog loaded"
                );
                Self::from_records(cards)
            }
            Err(err) => {
                tracing::warn!(
                    source = source.source_name(),
                    error = %format!("{err:#}"),
                    "card catalog fetch failed; continuing with empty catalog"
                );
                Self::failed(format!("{err:#}"))
            }
        }
    }

    /// Medium icon URL for `name`, matched case-insensitively. Empty when the card is unknown.
    pub fn icon_for(&self, name: &str) -> &str {
        self.by_name
            .get(&name_key(name))
            .map(|&idx| self.cards[idx].medium_icon())
            .unwrap_or("")
    }

    pub fn valid_names(&self) -> Vec<&str> {
        self.cards
            .iter()
            .map(|c| c.name.as_str())
            .filter(|n| !n.is_empty())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
