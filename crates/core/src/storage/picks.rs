use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Writes `recommendation` as indented JSON, replacing whatever is at `path`.
/// The parent directory must already exist.
pub fn save_picks<R: Serialize>(recommendation: &R, path: &Path) -> anyhow::Result<()> {
    let mut body =
        serde_json::to_string_pretty(recommendation).context("failed to serialize recommendation")?;
    body.push('\n');

    std::fs::write(path, body)
        .with_context(|| format!("failed to write picks to {}", path.display()))?;
    Ok(())
}

pub fn load_picks<R: DeserializeOwned>(path: &Path) -> anyhow::Result<R> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read picks from {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("picks file {} does not match the expected schema", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contract::RecommendationContract;
    use crate::domain::recommendation::{FlatRecommendation, PositionalRecommendation};

    #[test]
    fn positional_round_trip_is_field_for_field_equal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("picks.json");
        let rec = PositionalRecommendation::missing_credential_fallback();

        save_picks(&rec, &path).unwrap();
        let loaded: PositionalRecommendation = load_picks(&path).unwrap();
        assert_eq!(loaded, rec);
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("picks.json");
        std::fs::write(&path, "x".repeat(10_000)).unwrap();

        let rec = FlatRecommendation::service_failure_fallback();
        save_picks(&rec, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n  \"gw_captain\""));
        assert_eq!(load_picks::<FlatRecommendation>(&path).unwrap(), rec);
    }

    #[test]
    fn missing_parent_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("public").join("picks.json");
        let err = save_picks(&FlatRecommendation::missing_credential_fallback(), &path).unwrap_err();
        assert!(err.to_string().contains("failed to write picks"));
        assert!(!path.exists());
    }
}
