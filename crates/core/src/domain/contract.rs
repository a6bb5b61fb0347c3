use crate::domain::loadout::DECK_SIZE;
use anyhow::ensure;
use serde::{Deserialize, Deserializer};

/// The JSON object the model is asked to emit. Absent or `null` lists read as empty.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmDeckContract {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub deck: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub insights: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub playstyle_tips: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub weaknesses: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl LlmDeckContract {
    pub fn validate(self) -> anyhow::Result<Self> {
        ensure!(
            self.deck.len() == DECK_SIZE,
            "deck must be a list of {DECK_SIZE} cards (got {})",
            self.deck.len()
        );
        ensure!(
            self.deck.iter().all(|name| !name.trim().is_empty()),
            "deck card names must be non-empty"
        );
        Ok(self)
    }
}
