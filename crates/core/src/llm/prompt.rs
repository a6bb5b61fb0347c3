use serde::Serialize;

/// What the player told us, passed to the model verbatim as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct UserPreferences<'a> {
    pub bracket: &'a str,
    pub style: &'a str,
    pub favorite_card: Option<&'a str>,
    pub hate_card: Option<&'a str>,
    pub notes: Option<&'a str>,
}

pub fn deck_prompt(valid_cards: &[&str], prefs: &UserPreferences<'_>) -> String {
    let allowed = serde_json::to_string(valid_cards).unwrap_or_else(|_| "[]".to_string());
    let prefs = serde_json::to_string(prefs).unwrap_or_else(|_| "{}".to_string());
    let allowed_line = format!("- You MUST pick card names ONLY from this allowed list: {allowed}");

    [
        "You are a Clash Royale coach.",
        "",
        "Task:",
        "Generate ONE 8-card deck that matches the user's bracket and style, and give short actionable insights.",
        "",
        "Constraints:",
        allowed_line.as_str(),
        "- Output MUST be valid JSON only (no markdown, no extra text).",
        "- JSON shape:",
        "{",
        "  \"deck\": [\"Card1\",\"Card2\",\"Card3\",\"Card4\",\"Card5\",\"Card6\",\"Card7\",\"Card8\"],",
        "  \"insights\": [\"...\",\"...\",\"...\"],",
        "  \"playstyle_tips\": [\"...\",\"...\",\"...\"],",
        "  \"weaknesses\": [\"...\",\"...\"]",
        "}",
        "",
        "User preferences:",
        prefs.as_str(),
    ]
    .join("\n")
}
