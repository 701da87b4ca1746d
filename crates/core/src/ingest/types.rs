use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The subset of the provider's `bootstrap-static` document the pipeline reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapStatic {
    pub elements: Vec<RawPlayer>,
    pub teams: Vec<Team>,
    #[serde(default)]
    pub events: Vec<Gameweek>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPlayer {
    pub id: u32,
    pub web_name: String,
    pub team: u32,
    /// 1-based position code (1=GKP .. 4=FWD).
    pub element_type: u8,
    pub minutes: u32,
    /// Decimal string, e.g. "7.5".
    pub form: String,
    pub total_points: i32,
    /// Tenths of a currency unit (105 => 10.5).
    pub now_cost: u32,
    /// Decimal string, e.g. "45.3".
    pub selected_by_percent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gameweek {
    pub id: u32,
    pub name: String,
    pub deadline_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub is_next: bool,
    #[serde(default)]
    pub finished: bool,
}
