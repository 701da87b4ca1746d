use crate::domain::contract::RecommendationContract;
use crate::llm::error::{LlmCallError, LlmStage};
use crate::llm::Provider;

pub fn extract_json(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.starts_with("```") {
        // Strip Markdown fences (```json ... ``` or ``` ... ```).
        let mut inner = trimmed;
        if let Some(after_first) = inner.splitn(2, '\n').nth(1) {
            inner = after_first;
        }
        if let Some(end) = inner.rfind("```") {
            inner = &inner[..end];
        }
        return Some(inner.trim().to_string());
    }

    // Best-effort: first '{' to last '}'.
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(trimmed[start..=end].trim().to_string())
}

/// Decodes a model reply into `R` and checks it against the schema contract.
pub fn parse_recommendation<R: RecommendationContract>(
    provider: Provider,
    text: &str,
) -> anyhow::Result<R> {
    let json_str = extract_json(text).unwrap_or_else(|| text.trim().to_string());

    let parsed = serde_json::from_str::<R>(&json_str).map_err(|err| {
        LlmCallError::new(
            provider,
            LlmStage::Decode,
            format!("reply does not match the {} schema: {err}", R::VARIANT),
        )
        .with_raw(text, &json_str)
    })?;

    parsed.validate_and_normalize().map_err(|err| {
        LlmCallError::new(provider, LlmStage::Validate, err.to_string())
            .with_raw(text, &json_str)
            .into()
    })
}
