use crate::llm::Provider;
use serde_json::Value;
use std::fmt;

/// Where in the request → reply → recommendation chain a call broke down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmStage {
    Http,
    Decode,
    Validate,
}

impl LlmStage {
    pub fn as_str(self) -> &'static str {
        match self {
            LlmStage::Http => "http",
            LlmStage::Decode => "decode",
            LlmStage::Validate => "validate",
        }
    }
}

impl fmt::Display for LlmStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed LLM call, keeping whatever the model or server sent back so the
/// worker can log it next to the fallback it persisted.
#[derive(Debug, Clone)]
pub struct LlmCallError {
    pub provider: Provider,
    pub stage: LlmStage,
    pub detail: String,
    pub raw_text: Option<String>,
    /// `raw_text` (or the JSON carved out of it) when it parses as JSON.
    pub raw_json: Option<Value>,
}

impl LlmCallError {
    pub fn new(provider: Provider, stage: LlmStage, detail: impl Into<String>) -> Self {
        Self {
            provider,
            stage,
            detail: detail.into(),
            raw_text: None,
            raw_json: None,
        }
    }

    /// Attaches the raw reply. `json_candidate` is parsed for `raw_json`.
    pub fn with_raw(mut self, raw_text: impl Into<String>, json_candidate: &str) -> Self {
        self.raw_text = Some(raw_text.into());
        self.raw_json = serde_json::from_str(json_candidate).ok();
        self
    }
}

impl fmt::Display for LlmCallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {} failure: {}", self.provider, self.stage, self.detail)
    }
}

impl std::error::Error for LlmCallError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_raw_json_only_when_it_parses() {
        let err = LlmCallError::new(Provider::Groq, LlmStage::Http, "status=429")
            .with_raw("{\"error\":{\"message\":\"rate limited\"}}", "{\"error\":{\"message\":\"rate limited\"}}");
        assert_eq!(err.raw_json.as_ref().unwrap()["error"]["message"], "rate limited");
        assert_eq!(err.to_string(), "Groq http failure: status=429");

        let err = LlmCallError::new(Provider::Groq, LlmStage::Decode, "bad").with_raw("<html>", "<html>");
        assert_eq!(err.raw_text.as_deref(), Some("<html>"));
        assert!(err.raw_json.is_none());
    }
}
