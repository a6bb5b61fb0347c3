use crate::domain::contract::LlmDeckContract;
use anyhow::Context;

/// The JSON object inside a model reply: the body of a leading Markdown fence, or else the span
/// from the first `{` to the last `}`.
pub fn extract_json(text: &str) -> Option<&str> {
    let text = text.trim();
    if let Some(fenced) = text.strip_prefix("```") {
        // The opening line carries the info string (`json`), never content.
        let body = fenced.split_once('\n').map_or("", |(_, rest)| rest);
        let body = body.rfind("```").map_or(body, |close| &body[..close]);
        return Some(body.trim());
    }

    let open = text.find('{')?;
    let close = text.rfind('}')?;
    (open < close).then(|| &text[open..=close])
}

pub fn parse_deck(text: &str) -> anyhow::Result<LlmDeckContract> {
    let json_str = extract_json(text).unwrap_or_else(|| text.trim());
    let parsed = serde_json::from_str::<LlmDeckContract>(json_str)
        .context("LLM output is not valid JSON for the deck schema")?;
    parsed.validate()
}

/// First `max_chars` characters of `text`, for error messages.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
