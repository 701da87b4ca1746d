use crate::ingest::types::{BootstrapStatic, RawPlayer, Team};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

// Hand-tuned selection constants. Goalkeepers rotate less, so they clear a
// lower minutes bar than outfield players.
pub const OVERALL_MIN_MINUTES: u32 = 500;
pub const OVERALL_QUOTA: usize = 30;

pub const GKP_MIN_MINUTES: u32 = 300;
pub const OUTFIELD_MIN_MINUTES: u32 = 500;

pub const GKP_QUOTA: usize = 10;
pub const DEF_QUOTA: usize = 20;
pub const MID_QUOTA: usize = 25;
pub const FWD_QUOTA: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "GKP")]
    Gkp,
    #[serde(rename = "DEF")]
    Def,
    #[serde(rename = "MID")]
    Mid,
    #[serde(rename = "FWD")]
    Fwd,
}

impl Position {
    pub const ALL: [Position; 4] = [Position::Gkp, Position::Def, Position::Mid, Position::Fwd];

    /// Maps the provider's 1-based `element_type`. Other codes are not squad players.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Position::Gkp),
            2 => Some(Position::Def),
            3 => Some(Position::Mid),
            4 => Some(Position::Fwd),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Position::Gkp => "GKP",
            Position::Def => "DEF",
            Position::Mid => "MID",
            Position::Fwd => "FWD",
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPlayer {
    pub name: String,
    pub team: String,
    pub position: Position,
    pub form: f64,
    pub points: i32,
    pub price: f64,
    pub selected_by: f64,
    #[serde(skip)]
    pub minutes: u32,
}

/// Ranked players per position, each list in rank order.
pub type PositionGroups = BTreeMap<Position, Vec<RankedPlayer>>;

#[derive(Debug, Clone, Copy)]
pub struct OverallPolicy {
    pub min_minutes: u32,
    pub quota: usize,
}

impl Default for OverallPolicy {
    fn default() -> Self {
        Self {
            min_minutes: OVERALL_MIN_MINUTES,
            quota: OVERALL_QUOTA,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionRule {
    /// Players need strictly more minutes than this.
    pub min_minutes: u32,
    pub quota: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct PositionalPolicy {
    pub gkp: PositionRule,
    pub def: PositionRule,
    pub mid: PositionRule,
    pub fwd: PositionRule,
}

impl Default for PositionalPolicy {
    fn default() -> Self {
        Self {
            gkp: PositionRule {
                min_minutes: GKP_MIN_MINUTES,
                quota: GKP_QUOTA,
            },
            def: PositionRule {
                min_minutes: OUTFIELD_MIN_MINUTES,
                quota: DEF_QUOTA,
            },
            mid: PositionRule {
                min_minutes: OUTFIELD_MIN_MINUTES,
                quota: MID_QUOTA,
            },
            fwd: PositionRule {
                min_minutes: OUTFIELD_MIN_MINUTES,
                quota: FWD_QUOTA,
            },
        }
    }
}

impl PositionalPolicy {
    pub fn rule(&self, position: Position) -> PositionRule {
        match position {
            Position::Gkp => self.gkp,
            Position::Def => self.def,
            Position::Mid => self.mid,
            Position::Fwd => self.fwd,
        }
    }
}

pub fn team_names(teams: &[Team]) -> HashMap<u32, String> {
    teams.iter().map(|t| (t.id, t.name.clone())).collect()
}

/// Simple variant: one minutes bar and one quota across every position.
pub fn rank_overall(data: &BootstrapStatic, policy: &OverallPolicy) -> Result<Vec<RankedPlayer>> {
    let teams = team_names(&data.teams);

    let mut pool = Vec::new();
    for player in &data.elements {
        let Some(position) = Position::from_code(player.element_type) else {
            tracing::debug!(id = player.id, element_type = player.element_type, "skipping non-squad element");
            continue;
        };
        if player.minutes > policy.min_minutes {
            pool.push(normalize(player, position, &teams)?);
        }
    }

    sort_by_rank(&mut pool);
    pool.truncate(policy.quota);
    Ok(pool)
}

/// Position-aware variant: each position gets its own minutes bar and quota.
/// Every position is present in the result, possibly with an empty list.
pub fn rank_by_position(data: &BootstrapStatic, policy: &PositionalPolicy) -> Result<PositionGroups> {
    let teams = team_names(&data.teams);

    let mut groups: PositionGroups = Position::ALL.iter().map(|p| (*p, Vec::new())).collect();

    for player in &data.elements {
        let Some(position) = Position::from_code(player.element_type) else {
            tracing::debug!(id = player.id, element_type = player.element_type, "skipping non-squad element");
            continue;
        };
        if player.minutes > policy.rule(position).min_minutes {
            let ranked = normalize(player, position, &teams)?;
            groups.entry(position).or_default().push(ranked);
        }
    }

    for (position, players) in groups.iter_mut() {
        sort_by_rank(players);
        players.truncate(policy.rule(*position).quota);
    }

    Ok(groups)
}

/// Descending by form, then total points. `sort_by` is stable, so exact ties
/// keep the provider's order.
fn sort_by_rank(players: &mut [RankedPlayer]) {
    players.sort_by(|a, b| rank_order(b, a));
}

fn rank_order(a: &RankedPlayer, b: &RankedPlayer) -> Ordering {
    a.form
        .total_cmp(&b.form)
        .then_with(|| a.points.cmp(&b.points))
}

fn normalize(player: &RawPlayer, position: Position, teams: &HashMap<u32, String>) -> Result<RankedPlayer> {
    let team = teams
        .get(&player.team)
        .with_context(|| format!("player {} ({}) references unknown team {}", player.id, player.web_name, player.team))?
        .clone();

    Ok(RankedPlayer {
        name: player.web_name.clone(),
        team,
        position,
        form: parse_decimal(&player.form, "form", player)?,
        points: player.total_points,
        price: f64::from(player.now_cost) / 10.0,
        selected_by: parse_decimal(&player.selected_by_percent, "selected_by_percent", player)?,
        minutes: player.minutes,
    })
}

fn parse_decimal(s: &str, field: &str, player: &RawPlayer) -> Result<f64> {
    let value = s
        .trim()
        .parse::<f64>()
        .with_context(|| format!("player {} ({}) has non-numeric {field}: {s:?}", player.id, player.web_name))?;
    anyhow::ensure!(
        value.is_finite(),
        "player {} ({}) has non-finite {field}: {s:?}",
        player.id,
        player.web_name
    );
    Ok(value)
}
