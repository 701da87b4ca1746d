use crate::domain::contract::RecommendationContract;
use crate::llm::groq::{GroqClient, GroqOptions};
use crate::llm::json;
use crate::llm::LlmClient;
use std::fmt;

/// Why a fallback payload was used instead of a model reply.
#[derive(Debug)]
pub enum DegradedReason {
    MissingCredential,
    ServiceFailure(anyhow::Error),
}

impl fmt::Display for DegradedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradedReason::MissingCredential => f.write_str("no LLM credential configured"),
            DegradedReason::ServiceFailure(err) => write!(f, "LLM call failed: {err:#}"),
        }
    }
}

#[derive(Debug)]
pub enum RecommendationOutcome<R> {
    Generated(R),
    Degraded { reason: DegradedReason, recommendation: R },
}

impl<R> RecommendationOutcome<R> {
    pub fn recommendation(&self) -> &R {
        match self {
            RecommendationOutcome::Generated(r) => r,
            RecommendationOutcome::Degraded { recommendation, .. } => recommendation,
        }
    }

    pub fn into_recommendation(self) -> R {
        match self {
            RecommendationOutcome::Generated(r) => r,
            RecommendationOutcome::Degraded { recommendation, .. } => recommendation,
        }
    }

    pub fn degraded_reason(&self) -> Option<&DegradedReason> {
        match self {
            RecommendationOutcome::Generated(_) => None,
            RecommendationOutcome::Degraded { reason, .. } => Some(reason),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded_reason().is_some()
    }
}

/// Turns a prompt into a recommendation. Never fails: every problem maps to
/// one of the two fallback payloads.
pub struct RecommendationClient {
    llm: Option<Box<dyn LlmClient>>,
}

impl RecommendationClient {
    /// `credential` is passed in explicitly; `None` selects the offline fallback.
    pub fn new(credential: Option<String>, options: GroqOptions) -> anyhow::Result<Self> {
        let llm = match credential.filter(|k| !k.trim().is_empty()) {
            Some(api_key) => Some(Box::new(GroqClient::new(api_key, options)?) as Box<dyn LlmClient>),
            None => None,
        };
        Ok(Self { llm })
    }

    /// Keeps `llm` only when `credential` is present and non-blank.
    pub fn with_credential(credential: Option<&str>, llm: Box<dyn LlmClient>) -> Self {
        match credential {
            Some(key) if !key.trim().is_empty() => Self::with_llm(llm),
            _ => Self::offline(),
        }
    }

    pub fn with_llm(llm: Box<dyn LlmClient>) -> Self {
        Self { llm: Some(llm) }
    }

    pub fn offline() -> Self {
        Self { llm: None }
    }

    pub fn has_credential(&self) -> bool {
        self.llm.is_some()
    }

    pub async fn recommend<R: RecommendationContract>(&self, prompt: &str) -> RecommendationOutcome<R> {
        let Some(llm) = self.llm.as_deref() else {
            tracing::warn!(variant = %R::VARIANT, "GROQ_API_KEY not configured; using fallback recommendation");
            return RecommendationOutcome::Degraded {
                reason: DegradedReason::MissingCredential,
                recommendation: R::missing_credential_fallback(),
            };
        };

        let result = async {
            let text = llm.complete_json(prompt).await?;
            json::parse_recommendation::<R>(llm.provider(), &text)
        }
        .await;

        match result {
            Ok(recommendation) => {
                tracing::info!(
                    variant = %R::VARIANT,
                    provider = ?llm.provider(),
                    captain = recommendation.captain(),
                    "LLM recommendation parsed"
                );
                RecommendationOutcome::Generated(recommendation)
            }
            Err(err) => {
                tracing::error!(
                    variant = %R::VARIANT,
                    provider = ?llm.provider(),
                    error = %format!("{err:#}"),
                    "LLM recommendation failed; using service-failure fallback"
                );
                RecommendationOutcome::Degraded {
                    reason: DegradedReason::ServiceFailure(err),
                    recommendation: R::service_failure_fallback(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recommendation::{FlatRecommendation, PositionTransfers, PositionalRecommendation};
    use crate::llm::Provider;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakeLlm {
        calls: Arc<AtomicUsize>,
        reply: anyhow::Result<String>,
    }

    impl FakeLlm {
        fn replying(reply: anyhow::Result<String>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    calls: calls.clone(),
                    reply,
                },
                calls,
            )
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for FakeLlm {
        fn provider(&self) -> Provider {
            Provider::Groq
        }

        async fn complete_json(&self, _prompt: &str) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(err) => Err(anyhow::anyhow!("{err}")),
            }
        }
    }

    #[tokio::test]
    async fn missing_credential_skips_the_call() {
        let client = RecommendationClient::new(None, GroqOptions::default()).unwrap();
        assert!(!client.has_credential());

        let outcome = client.recommend::<FlatRecommendation>("prompt").await;
        assert!(matches!(outcome.degraded_reason(), Some(DegradedReason::MissingCredential)));
        assert_eq!(outcome.into_recommendation(), FlatRecommendation::missing_credential_fallback());
    }

    #[tokio::test]
    async fn blank_credential_counts_as_missing() {
        let client = RecommendationClient::new(Some("  ".to_string()), GroqOptions::default()).unwrap();
        assert!(!client.has_credential());
    }

    #[tokio::test]
    async fn absent_credential_never_reaches_the_llm() {
        let reply = serde_json::to_string(&FlatRecommendation::service_failure_fallback()).unwrap();
        for credential in [None, Some(""), Some("   ")] {
            let (fake, calls) = FakeLlm::replying(Ok(reply.clone()));
            let client = RecommendationClient::with_credential(credential, Box::new(fake));
            assert!(!client.has_credential());

            let outcome = client.recommend::<FlatRecommendation>("prompt").await;
            assert_eq!(calls.load(Ordering::SeqCst), 0);
            assert!(matches!(outcome.degraded_reason(), Some(DegradedReason::MissingCredential)));
            assert_eq!(outcome.into_recommendation(), FlatRecommendation::missing_credential_fallback());
        }
    }

    #[tokio::test]
    async fn present_credential_calls_the_llm_once() {
        let reply = serde_json::to_string(&FlatRecommendation::service_failure_fallback()).unwrap();
        let (fake, calls) = FakeLlm::replying(Ok(reply));
        let client = RecommendationClient::with_credential(Some("gsk_test"), Box::new(fake));

        let outcome = client.recommend::<FlatRecommendation>("prompt").await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!outcome.is_degraded());
    }

    #[tokio::test]
    async fn malformed_reply_yields_service_failure_fallback() {
        let (fake, calls) = FakeLlm::replying(Ok("{\"gw_captain\": ".to_string()));
        let client = RecommendationClient::with_llm(Box::new(fake));

        let outcome = client.recommend::<FlatRecommendation>("prompt").await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(outcome.degraded_reason(), Some(DegradedReason::ServiceFailure(_))));

        let rec = outcome.into_recommendation();
        assert_eq!(rec, FlatRecommendation::service_failure_fallback());
        assert_ne!(rec, FlatRecommendation::missing_credential_fallback());
    }

    #[tokio::test]
    async fn transport_error_yields_service_failure_fallback() {
        let (fake, calls) = FakeLlm::replying(Err(anyhow::anyhow!("connection reset")));
        let client = RecommendationClient::with_llm(Box::new(fake));

        let outcome = client.recommend::<PositionalRecommendation>("prompt").await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let reason = outcome.degraded_reason().unwrap().to_string();
        assert!(reason.contains("connection reset"));

        let rec = outcome.into_recommendation();
        for (position, picks) in rec.transfers_in.iter().chain(rec.transfers_out.iter()) {
            assert_eq!(picks.len(), PositionTransfers::required(position));
        }
    }

    #[tokio::test]
    async fn valid_reply_is_generated() {
        let reply = serde_json::to_string(&PositionalRecommendation::missing_credential_fallback()).unwrap();
        let (fake, _calls) = FakeLlm::replying(Ok(format!("```json\n{reply}\n```")));
        let client = RecommendationClient::with_llm(Box::new(fake));

        let outcome = client.recommend::<PositionalRecommendation>("prompt").await;
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.recommendation().gw_captain, "Haaland");
    }

    #[tokio::test]
    async fn wrong_schema_reply_is_a_service_failure() {
        let reply = serde_json::to_string(&FlatRecommendation::missing_credential_fallback()).unwrap();
        let (fake, _calls) = FakeLlm::replying(Ok(reply));
        let client = RecommendationClient::with_llm(Box::new(fake));

        let outcome = client.recommend::<PositionalRecommendation>("prompt").await;
        assert!(matches!(outcome.degraded_reason(), Some(DegradedReason::ServiceFailure(_))));
        assert_eq!(
            outcome.into_recommendation(),
            PositionalRecommendation::service_failure_fallback()
        );
    }
}
