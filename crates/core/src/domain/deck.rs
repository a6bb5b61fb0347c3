use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct BaselineRequest {
    pub bracket: String,
    pub style: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiRequest {
    pub bracket: String,
    pub style: String,
    #[serde(default)]
    pub favorite_card: Option<String>,
    #[serde(default)]
    pub hate_card: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A card in a recommended deck. `image` is empty when the catalog has no icon for the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckCard {
    pub name: String,
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub deck: Vec<DeckCard>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiRecommendation {
    pub deck: Vec<DeckCard>,
    pub insights: Vec<String>,
    pub playstyle_tips: Vec<String>,
    pub weaknesses: Vec<String>,
}
