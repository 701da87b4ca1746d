use crate::config::Settings;
use crate::ingest::types::BootstrapStatic;
use anyhow::{Context, Result};
use serde_json::Value;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://fantasy.premierleague.com/api";
const BOOTSTRAP_PATH: &str = "/bootstrap-static/";
const USER_AGENT: &str = concat!("gwpicks/", env!("CARGO_PKG_VERSION"));

#[async_trait::async_trait]
pub trait StatsProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_bootstrap(&self) -> Result<BootstrapStatic>;
}

#[derive(Debug, Clone)]
pub struct FplHttpProvider {
    http: reqwest::Client,
    base_url: String,
}

impl FplHttpProvider {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings
            .fpl_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(secs) = settings.fpl_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .context("failed to build stats provider http client")?;

        Ok(Self { http, base_url })
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), BOOTSTRAP_PATH)
    }
}

#[async_trait::async_trait]
impl StatsProvider for FplHttpProvider {
    fn provider_name(&self) -> &'static str {
        "fpl_bootstrap_static"
    }

    async fn fetch_bootstrap(&self) -> Result<BootstrapStatic> {
        let url = self.url();
        let res = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("stats provider request failed: {url}"))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read stats provider response")?;

        if !status.is_success() {
            anyhow::bail!("stats provider HTTP {status}: {}", truncate(&text, 512));
        }

        decode_bootstrap(&text)
    }
}

/// Parses a `bootstrap-static` body. Missing `elements`/`teams` or mistyped
/// records are reported as a shape error rather than a JSON syntax error.
pub fn decode_bootstrap(text: &str) -> Result<BootstrapStatic> {
    let raw_json = serde_json::from_str::<Value>(text)
        .with_context(|| format!("stats provider response is not valid JSON: {}", truncate(text, 512)))?;

    for key in ["elements", "teams"] {
        anyhow::ensure!(
            raw_json.get(key).map(Value::is_array).unwrap_or(false),
            "stats provider response is missing the `{key}` array"
        );
    }

    serde_json::from_value::<BootstrapStatic>(raw_json)
        .context("failed to decode stats provider response into BootstrapStatic")
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_expected_shape_and_ignores_extra_fields() {
        let body = json!({
            "elements": [
                {
                    "id": 1,
                    "web_name": "Haaland",
                    "team": 13,
                    "element_type": 4,
                    "minutes": 1800,
                    "form": "8.2",
                    "total_points": 150,
                    "now_cost": 150,
                    "selected_by_percent": "85.1",
                    "news": ""
                }
            ],
            "teams": [{"id": 13, "name": "Man City", "short_name": "MCI"}],
            "events": [
                {"id": 7, "name": "Gameweek 7", "deadline_time": "2026-10-18T10:00:00Z", "is_next": true}
            ],
            "total_players": 11000000
        })
        .to_string();

        let parsed = decode_bootstrap(&body).unwrap();
        assert_eq!(parsed.elements.len(), 1);
        assert_eq!(parsed.elements[0].web_name, "Haaland");
        assert_eq!(parsed.teams[0].name, "Man City");
        assert!(parsed.events[0].is_next);
        assert!(!parsed.events[0].finished);
    }

    #[test]
    fn events_are_optional() {
        let body = json!({"elements": [], "teams": []}).to_string();
        let parsed = decode_bootstrap(&body).unwrap();
        assert!(parsed.events.is_empty());
    }

    #[test]
    fn rejects_missing_elements_key() {
        let body = json!({"teams": []}).to_string();
        let err = decode_bootstrap(&body).unwrap_err();
        assert!(format!("{err:#}").contains("elements"));
    }

    #[test]
    fn rejects_non_json_body() {
        assert!(decode_bootstrap("<html>maintenance</html>").is_err());
    }

    #[test]
    fn rejects_mistyped_player_record() {
        let body = json!({
            "elements": [{"id": 1, "web_name": "X", "team": "not-a-number"}],
            "teams": []
        })
        .to_string();
        assert!(decode_bootstrap(&body).is_err());
    }

    #[test]
    fn url_joins_base_and_path() {
        let settings = Settings {
            fpl_base_url: Some("http://localhost:9000/api/".to_string()),
            ..Default::default()
        };
        let provider = FplHttpProvider::from_settings(&settings).unwrap();
        assert_eq!(provider.url(), "http://localhost:9000/api/bootstrap-static/");
    }
}
