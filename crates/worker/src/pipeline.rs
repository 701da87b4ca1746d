use anyhow::Context;
use chrono::{DateTime, Utc};
use gwpicks_core::config::Variant;
use gwpicks_core::domain::contract::RecommendationContract;
use gwpicks_core::domain::recommendation::{FlatRecommendation, PositionalRecommendation};
use gwpicks_core::ingest::provider::StatsProvider;
use gwpicks_core::ingest::types::{BootstrapStatic, Gameweek};
use gwpicks_core::llm::error::LlmCallError;
use gwpicks_core::llm::{prompt, DegradedReason, RecommendationClient, RecommendationOutcome};
use gwpicks_core::ranking::{self, OverallPolicy, PositionalPolicy};
use gwpicks_core::storage::picks;
use gwpicks_core::time::gameweek;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub variant: Variant,
    pub output_path: PathBuf,
    pub dry_run: bool,
    pub now_utc: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub variant: Variant,
    pub captain: String,
    pub degraded: bool,
    /// `None` on a dry run.
    pub written_to: Option<PathBuf>,
}

/// fetch → rank → prompt → recommend → persist, strictly in that order.
pub async fn run(
    provider: &dyn StatsProvider,
    recommender: &RecommendationClient,
    opts: &RunOptions,
) -> anyhow::Result<RunSummary> {
    tracing::info!(provider = provider.provider_name(), "fetching player data");
    let data = provider
        .fetch_bootstrap()
        .await
        .context("failed to fetch player data")?;
    tracing::info!(
        players = data.elements.len(),
        teams = data.teams.len(),
        "player data fetched"
    );

    let upcoming = gameweek::resolve_upcoming(&data.events, opts.now_utc);
    match &upcoming {
        Some(gw) => tracing::info!(gameweek = gw.id, name = %gw.name, deadline = ?gw.deadline_time, "upcoming gameweek"),
        None => tracing::warn!("no upcoming gameweek found; season may be over"),
    }

    match opts.variant {
        Variant::Flat => {
            let prompt = flat_prompt(&data, upcoming.as_ref())?;
            finish::<FlatRecommendation>(recommender, &prompt, opts).await
        }
        Variant::Positional => {
            let prompt = positional_prompt(&data, upcoming.as_ref())?;
            finish::<PositionalRecommendation>(recommender, &prompt, opts).await
        }
    }
}

fn flat_prompt(data: &BootstrapStatic, upcoming: Option<&Gameweek>) -> anyhow::Result<String> {
    let ranked = ranking::rank_overall(data, &OverallPolicy::default())?;
    tracing::info!(ranked = ranked.len(), "ranked top players overall");
    prompt::flat_prompt(&ranked, upcoming)
}

fn positional_prompt(data: &BootstrapStatic, upcoming: Option<&Gameweek>) -> anyhow::Result<String> {
    let groups = ranking::rank_by_position(data, &PositionalPolicy::default())?;
    for (position, players) in &groups {
        tracing::info!(%position, ranked = players.len(), "ranked position group");
    }
    prompt::positional_prompt(&groups, upcoming)
}

async fn finish<R: RecommendationContract>(
    recommender: &RecommendationClient,
    prompt: &str,
    opts: &RunOptions,
) -> anyhow::Result<RunSummary> {
    tracing::info!(variant = %R::VARIANT, prompt_chars = prompt.len(), "requesting recommendations");
    let outcome = recommender.recommend::<R>(prompt).await;
    report_degraded(&outcome);

    let degraded = outcome.is_degraded();
    let recommendation = outcome.into_recommendation();
    let captain = recommendation.captain().to_string();

    if opts.dry_run {
        let body = serde_json::to_string_pretty(&recommendation)?;
        tracing::info!(dry_run = true, path = %opts.output_path.display(), %body, "skipping write");
        return Ok(RunSummary {
            variant: R::VARIANT,
            captain,
            degraded,
            written_to: None,
        });
    }

    picks::save_picks(&recommendation, &opts.output_path)?;
    tracing::info!(path = %opts.output_path.display(), %captain, degraded, "picks saved");

    Ok(RunSummary {
        variant: R::VARIANT,
        captain,
        degraded,
        written_to: Some(opts.output_path.clone()),
    })
}

fn report_degraded<R>(outcome: &RecommendationOutcome<R>) {
    let Some(DegradedReason::ServiceFailure(err)) = outcome.degraded_reason() else {
        return;
    };

    sentry_anyhow::capture_anyhow(err);
    if let Some(diag) = err.downcast_ref::<LlmCallError>() {
        tracing::warn!(
            stage = %diag.stage,
            raw_text = diag.raw_text.as_deref().unwrap_or(""),
            raw_json = %diag.raw_json.as_ref().map(|v| v.to_string()).unwrap_or_default(),
            "raw LLM output for failed recommendation"
        );
    }
}
