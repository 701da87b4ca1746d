use crate::ranking::Position;
use serde::{Deserialize, Serialize};

/// Output of the flat pipeline: transfers are plain player names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRecommendation {
    pub gw_captain: String,
    pub captain_reason: String,
    pub differential: String,
    pub differential_reason: String,
    pub transfers_in: Vec<String>,
    pub transfers_out: Vec<String>,
    pub general_advice: String,
}

/// Output of the position-aware pipeline: transfers are grouped by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionalRecommendation {
    pub gw_captain: String,
    pub captain_reason: String,
    pub differential: String,
    pub differential_reason: String,
    pub transfers_in: PositionTransfers,
    pub transfers_out: PositionTransfers,
    pub general_advice: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionTransfers {
    #[serde(rename = "GKP")]
    pub gkp: Vec<TransferPick>,
    #[serde(rename = "DEF")]
    pub def: Vec<TransferPick>,
    #[serde(rename = "MID")]
    pub mid: Vec<TransferPick>,
    #[serde(rename = "FWD")]
    pub fwd: Vec<TransferPick>,
}

impl PositionTransfers {
    /// Required picks per position, in both transfer directions.
    pub const fn required(position: Position) -> usize {
        match position {
            Position::Gkp => 1,
            Position::Def => 4,
            Position::Mid => 5,
            Position::Fwd => 2,
        }
    }

    pub fn picks(&self, position: Position) -> &[TransferPick] {
        match position {
            Position::Gkp => &self.gkp,
            Position::Def => &self.def,
            Position::Mid => &self.mid,
            Position::Fwd => &self.fwd,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, &[TransferPick])> + '_ {
        Position::ALL.into_iter().map(move |p| (p, self.picks(p)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferPick {
    pub name: String,
    pub team: String,
    pub reason: String,
}

impl TransferPick {
    pub fn new(name: &str, team: &str, reason: &str) -> Self {
        Self {
            name: name.to_string(),
            team: team.to_string(),
            reason: reason.to_string(),
        }
    }
}
