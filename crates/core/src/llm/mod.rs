pub mod error;
pub mod groq;
pub mod json;
pub mod prompt;
pub mod recommend;

pub use recommend::{DegradedReason, RecommendationClient, RecommendationOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Groq,
}

/// A text-generation backend that answers a single prompt with a JSON object.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    fn provider(&self) -> Provider;

    async fn complete_json(&self, prompt: &str) -> anyhow::Result<String>;
}
