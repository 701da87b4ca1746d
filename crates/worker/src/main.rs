use clap::Parser;
use gwpicks_core::config::{Settings, Variant};
use gwpicks_core::ingest::provider::FplHttpProvider;
use gwpicks_core::llm::groq::GroqOptions;
use gwpicks_core::llm::RecommendationClient;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod pipeline;

#[derive(Debug, Parser)]
#[command(name = "gwpicks_worker", about = "Generate weekly fantasy picks and write them as JSON")]
struct Args {
    /// Output schema: "flat" or "positional". Falls back to PICKS_VARIANT, then "flat".
    #[arg(long)]
    variant: Option<Variant>,

    /// Where to write the picks. Falls back to PICKS_OUTPUT_PATH, then the variant's default.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Do everything except writing the output file.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let variant = match args.variant {
        Some(v) => v,
        None => settings.variant()?,
    };
    let output_path = args
        .output
        .or_else(|| settings.picks_output_path.clone())
        .unwrap_or_else(|| variant.default_output_path());

    let provider = FplHttpProvider::from_settings(&settings)?;
    let recommender = RecommendationClient::new(
        settings.groq_api_key.clone(),
        GroqOptions::from_settings(&settings),
    )?;

    tracing::info!(
        %variant,
        output = %output_path.display(),
        dry_run = args.dry_run,
        llm_configured = recommender.has_credential(),
        "picks run starting"
    );

    let opts = pipeline::RunOptions {
        variant,
        output_path,
        dry_run: args.dry_run,
        now_utc: chrono::Utc::now(),
    };

    let summary = match pipeline::run(&provider, &recommender, &opts).await {
        Ok(summary) => summary,
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %format!("{err:#}"), "picks run failed");
            return Err(err);
        }
    };

    tracing::info!(
        variant = %summary.variant,
        captain = %summary.captain,
        degraded = summary.degraded,
        "picks run finished"
    );
    Ok(())
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_variant_and_output_flags() {
        let args = Args::try_parse_from([
            "gwpicks_worker",
            "--variant",
            "positional",
            "--output",
            "out/picks.json",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(args.variant, Some(Variant::Positional));
        assert_eq!(args.output, Some(PathBuf::from("out/picks.json")));
        assert!(args.dry_run);
    }

    #[test]
    fn no_flags_are_required() {
        let args = Args::try_parse_from(["gwpicks_worker"]).unwrap();
        assert_eq!(args.variant, None);
        assert!(!args.dry_run);
    }

    #[test]
    fn rejects_unknown_variant() {
        assert!(Args::try_parse_from(["gwpicks_worker", "--variant", "tiered"]).is_err());
    }
}
