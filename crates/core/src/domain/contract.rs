use crate::config::Variant;
use crate::domain::recommendation::{
    FlatRecommendation, PositionTransfers, PositionalRecommendation, TransferPick,
};
use crate::ranking::Position;
use anyhow::ensure;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Shared behaviour of the two output schemas: validation of model replies and
/// the two deterministic placeholders used when no reply is available.
pub trait RecommendationContract: Serialize + DeserializeOwned + Send + Sized + 'static {
    const VARIANT: Variant;

    /// Trims text fields and rejects replies that do not fit the schema.
    fn validate_and_normalize(self) -> anyhow::Result<Self>;

    /// Returned without any network call when no credential is configured.
    fn missing_credential_fallback() -> Self;

    /// Returned when a credential exists but the call or its reply failed.
    /// Its text says so, so the persisted file is visibly degraded.
    fn service_failure_fallback() -> Self;

    fn captain(&self) -> &str;
}

const SERVICE_UNAVAILABLE: &str = "AI service unavailable - using default recommendation";

fn required_text(value: String, field: &str) -> anyhow::Result<String> {
    let value = value.trim().to_string();
    ensure!(!value.is_empty(), "{field} must be non-empty");
    Ok(value)
}

fn optional_text(value: String) -> String {
    value.trim().to_string()
}

impl RecommendationContract for FlatRecommendation {
    const VARIANT: Variant = Variant::Flat;

    fn validate_and_normalize(self) -> anyhow::Result<Self> {
        let transfers_in: Vec<String> = self
            .transfers_in
            .into_iter()
            .map(optional_text)
            .filter(|s| !s.is_empty())
            .collect();
        let transfers_out: Vec<String> = self
            .transfers_out
            .into_iter()
            .map(optional_text)
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            gw_captain: required_text(self.gw_captain, "gw_captain")?,
            captain_reason: optional_text(self.captain_reason),
            differential: required_text(self.differential, "differential")?,
            differential_reason: optional_text(self.differential_reason),
            transfers_in,
            transfers_out,
            general_advice: optional_text(self.general_advice),
        })
    }

    fn missing_credential_fallback() -> Self {
        Self {
            gw_captain: "Haaland".to_string(),
            captain_reason: "Top scorer with excellent fixtures".to_string(),
            differential: "Mbeumo".to_string(),
            differential_reason: "Low ownership but consistent returns".to_string(),
            transfers_in: vec!["Salah".to_string(), "Saka".to_string()],
            transfers_out: vec!["Injured Player".to_string(), "Suspended Player".to_string()],
            general_advice: "Focus on form over fixtures this week".to_string(),
        }
    }

    fn service_failure_fallback() -> Self {
        Self {
            gw_captain: "Haaland".to_string(),
            captain_reason: SERVICE_UNAVAILABLE.to_string(),
            differential: "Mbeumo".to_string(),
            differential_reason: "Low ownership option".to_string(),
            transfers_in: vec!["Form Player".to_string()],
            transfers_out: vec!["Check manually".to_string()],
            general_advice: "AI service temporarily unavailable".to_string(),
        }
    }

    fn captain(&self) -> &str {
        &self.gw_captain
    }
}

impl PositionTransfers {
    fn validate_and_normalize(self, direction: &str) -> anyhow::Result<Self> {
        let check = |position: Position, picks: Vec<TransferPick>| -> anyhow::Result<Vec<TransferPick>> {
            let required = PositionTransfers::required(position);
            ensure!(
                picks.len() == required,
                "{direction}.{position} must contain exactly {required} picks (got {})",
                picks.len()
            );
            picks
                .into_iter()
                .map(|pick| -> anyhow::Result<TransferPick> {
                    Ok(TransferPick {
                        name: required_text(pick.name, &format!("{direction}.{position}.name"))?,
                        team: optional_text(pick.team),
                        reason: optional_text(pick.reason),
                    })
                })
                .collect()
        };

        Ok(Self {
            gkp: check(Position::Gkp, self.gkp)?,
            def: check(Position::Def, self.def)?,
            mid: check(Position::Mid, self.mid)?,
            fwd: check(Position::Fwd, self.fwd)?,
        })
    }
}

impl RecommendationContract for PositionalRecommendation {
    const VARIANT: Variant = Variant::Positional;

    fn validate_and_normalize(self) -> anyhow::Result<Self> {
        Ok(Self {
            gw_captain: required_text(self.gw_captain, "gw_captain")?,
            captain_reason: optional_text(self.captain_reason),
            differential: required_text(self.differential, "differential")?,
            differential_reason: optional_text(self.differential_reason),
            transfers_in: self.transfers_in.validate_and_normalize("transfers_in")?,
            transfers_out: self.transfers_out.validate_and_normalize("transfers_out")?,
            general_advice: optional_text(self.general_advice),
        })
    }

    fn missing_credential_fallback() -> Self {
        let pick = |name: &str, team: &str, reason: &str| TransferPick::new(name, team, reason);
        Self {
            gw_captain: "Haaland".to_string(),
            captain_reason: "Top scorer with excellent fixtures".to_string(),
            differential: "Mbeumo".to_string(),
            differential_reason: "Low ownership but consistent returns".to_string(),
            transfers_in: PositionTransfers {
                gkp: vec![pick("Raya", "Arsenal", "Clean sheet machine behind a settled back line")],
                def: vec![
                    pick("Gabriel", "Arsenal", "Set-piece threat and clean sheets"),
                    pick("Saliba", "Arsenal", "Nailed starter in the best defence"),
                    pick("Alexander-Arnold", "Liverpool", "Attacking returns from full-back"),
                    pick("Gvardiol", "Man City", "Goal threat rarely seen from a centre-back"),
                ],
                mid: vec![
                    pick("Salah", "Liverpool", "Premium returns week in, week out"),
                    pick("Saka", "Arsenal", "On penalties and creating chances"),
                    pick("Palmer", "Chelsea", "Involved in most of Chelsea's goals"),
                    pick("Mbeumo", "Brentford", "Low ownership with consistent returns"),
                    pick("Gordon", "Newcastle", "Strong underlying numbers"),
                ],
                fwd: vec![
                    pick("Haaland", "Man City", "Top scorer with excellent fixtures"),
                    pick("Isak", "Newcastle", "In-form striker at a fair price"),
                ],
            },
            transfers_out: PositionTransfers {
                gkp: vec![pick("Rotated Goalkeeper", "-", "Not starting regularly")],
                def: vec![
                    pick("Injured Defender", "-", "Check the injury news"),
                    pick("Suspended Defender", "-", "Misses the upcoming gameweek"),
                    pick("Benched Defender", "-", "Losing minutes to rotation"),
                    pick("Out-of-form Defender", "-", "No returns in recent weeks"),
                ],
                mid: vec![
                    pick("Injured Midfielder", "-", "Check the injury news"),
                    pick("Suspended Midfielder", "-", "Misses the upcoming gameweek"),
                    pick("Benched Midfielder", "-", "Losing minutes to rotation"),
                    pick("Out-of-form Midfielder", "-", "No returns in recent weeks"),
                    pick("Tough-fixture Midfielder", "-", "Difficult run of fixtures"),
                ],
                fwd: vec![
                    pick("Injured Forward", "-", "Check the injury news"),
                    pick("Out-of-form Forward", "-", "No returns in recent weeks"),
                ],
            },
            general_advice: "Focus on form over fixtures this week".to_string(),
        }
    }

    fn service_failure_fallback() -> Self {
        let placeholder = |position: Position, label: &str| -> Vec<TransferPick> {
            (1..=PositionTransfers::required(position))
                .map(|i| TransferPick::new(&format!("{label} {position} {i}"), "-", SERVICE_UNAVAILABLE))
                .collect()
        };
        let side = |label: &str| PositionTransfers {
            gkp: placeholder(Position::Gkp, label),
            def: placeholder(Position::Def, label),
            mid: placeholder(Position::Mid, label),
            fwd: placeholder(Position::Fwd, label),
        };
        Self {
            gw_captain: "Haaland".to_string(),
            captain_reason: SERVICE_UNAVAILABLE.to_string(),
            differential: "Mbeumo".to_string(),
            differential_reason: "Low ownership option".to_string(),
            transfers_in: side("Form"),
            transfers_out: side("Check manually"),
            general_advice: "AI service temporarily unavailable".to_string(),
        }
    }

    fn captain(&self) -> &str {
        &self.gw_captain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_exact_counts(transfers: &PositionTransfers) {
        for (position, picks) in transfers.iter() {
            assert_eq!(picks.len(), PositionTransfers::required(position), "{position}");
        }
    }

    #[test]
    fn positional_fallbacks_have_exact_counts() {
        for rec in [
            PositionalRecommendation::missing_credential_fallback(),
            PositionalRecommendation::service_failure_fallback(),
        ] {
            assert_exact_counts(&rec.transfers_in);
            assert_exact_counts(&rec.transfers_out);
            // Fallbacks must satisfy the same contract as model replies.
            rec.clone().validate_and_normalize().unwrap();
        }
    }

    #[test]
    fn fallbacks_are_distinguishable() {
        assert_ne!(
            FlatRecommendation::missing_credential_fallback(),
            FlatRecommendation::service_failure_fallback()
        );
        assert_ne!(
            PositionalRecommendation::missing_credential_fallback(),
            PositionalRecommendation::service_failure_fallback()
        );
        assert!(FlatRecommendation::service_failure_fallback()
            .captain_reason
            .contains("unavailable"));
        assert!(PositionalRecommendation::service_failure_fallback()
            .captain_reason
            .contains("unavailable"));
    }

    #[test]
    fn positional_serializes_position_labels() {
        let v = serde_json::to_value(PositionalRecommendation::missing_credential_fallback()).unwrap();
        let keys: Vec<_> = v["transfers_in"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 4);
        for label in ["GKP", "DEF", "MID", "FWD"] {
            assert!(v["transfers_out"].get(label).is_some(), "{label}");
        }
        assert_eq!(v["transfers_in"]["FWD"][0]["name"], "Haaland");
    }

    #[test]
    fn positional_rejects_wrong_cardinality() {
        let mut rec = PositionalRecommendation::missing_credential_fallback();
        rec.transfers_out.mid.pop();
        let err = rec.validate_and_normalize().unwrap_err();
        assert!(err.to_string().contains("transfers_out.MID"));
    }

    #[test]
    fn positional_rejects_blank_pick_name() {
        let mut rec = PositionalRecommendation::missing_credential_fallback();
        rec.transfers_in.gkp[0].name = "  ".to_string();
        assert!(rec.validate_and_normalize().is_err());
    }

    #[test]
    fn flat_trims_and_drops_blank_transfers() {
        let rec: FlatRecommendation = serde_json::from_value(json!({
            "gw_captain": " Salah ",
            "captain_reason": "Home fixture",
            "differential": "Wissa",
            "differential_reason": "Cheap",
            "transfers_in": ["Saka", " "],
            "transfers_out": [],
            "general_advice": "Hold"
        }))
        .unwrap();
        let rec = rec.validate_and_normalize().unwrap();
        assert_eq!(rec.gw_captain, "Salah");
        assert_eq!(rec.transfers_in, vec!["Saka".to_string()]);
    }

    #[test]
    fn flat_requires_captain() {
        let mut rec = FlatRecommendation::missing_credential_fallback();
        rec.gw_captain = String::new();
        assert!(rec.validate_and_normalize().is_err());
    }

    #[test]
    fn schemas_do_not_mix() {
        let positional = serde_json::to_value(PositionalRecommendation::missing_credential_fallback()).unwrap();
        assert!(serde_json::from_value::<FlatRecommendation>(positional).is_err());

        let flat = serde_json::to_value(FlatRecommendation::missing_credential_fallback()).unwrap();
        assert!(serde_json::from_value::<PositionalRecommendation>(flat).is_err());
    }
}
