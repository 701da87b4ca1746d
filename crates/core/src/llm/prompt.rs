use crate::domain::recommendation::PositionTransfers;
use crate::ingest::types::Gameweek;
use crate::ranking::{Position, PositionGroups, RankedPlayer};
use anyhow::Context;
use std::collections::BTreeMap;

/// Players shown to the model in the flat prompt.
pub const FLAT_PROMPT_PLAYERS: usize = 20;

/// Players per position shown to the model in the positional prompt.
pub const fn positional_prompt_players(position: Position) -> usize {
    match position {
        Position::Gkp => 5,
        Position::Def => 10,
        Position::Mid => 12,
        Position::Fwd => 8,
    }
}

const ADVISOR_PREAMBLE: &str =
    "You are an expert Fantasy Premier League advisor. Based on this player data, provide recommendations in JSON format.";

pub fn flat_prompt(players: &[RankedPlayer], gameweek: Option<&Gameweek>) -> anyhow::Result<String> {
    if players.is_empty() {
        tracing::warn!("no eligible players; prompting without player data");
    }

    let excerpt = &players[..players.len().min(FLAT_PROMPT_PLAYERS)];
    let player_json = serde_json::to_string_pretty(excerpt).context("failed to serialize player excerpt")?;

    let schema = [
        "{",
        "  \"gw_captain\": \"Player Name\",",
        "  \"captain_reason\": \"Why this player is the best captain choice\",",
        "  \"differential\": \"Player Name\",",
        "  \"differential_reason\": \"Why this low-owned player could be valuable\",",
        "  \"transfers_in\": [\"Player1\", \"Player2\", \"Player3\"],",
        "  \"transfers_out\": [\"Reason1\", \"Reason2\", \"Reason3\"],",
        "  \"general_advice\": \"Overall strategy for this gameweek\"",
        "}",
    ]
    .join("\n");

    Ok(format!(
        "{ADVISOR_PREAMBLE}\n{}\nPlayer Data:\n{player_json}\n\n\
Provide your response in this exact JSON format:\n{schema}\n\n\
Focus on form, fixtures, and value. Keep it concise.",
        gameweek_line(gameweek)
    ))
}

pub fn positional_prompt(groups: &PositionGroups, gameweek: Option<&Gameweek>) -> anyhow::Result<String> {
    if groups.values().all(Vec::is_empty) {
        tracing::warn!("no eligible players in any position; prompting without player data");
    }

    let excerpt: BTreeMap<&str, &[RankedPlayer]> = Position::ALL
        .iter()
        .map(|position| {
            let players = groups.get(position).map(Vec::as_slice).unwrap_or(&[]);
            let take = players.len().min(positional_prompt_players(*position));
            (position.label(), &players[..take])
        })
        .collect();
    let player_json = serde_json::to_string_pretty(&excerpt).context("failed to serialize player excerpt")?;

    let pick = "{\"name\": \"Player Name\", \"team\": \"Team Name\", \"reason\": \"Short reason\"}";
    let side = |label: &str| -> String {
        let rows: Vec<String> = Position::ALL
            .iter()
            .map(|position| {
                let picks = vec![pick; PositionTransfers::required(*position)].join(", ");
                format!("    \"{}\": [{picks}]", position.label())
            })
            .collect();
        format!("  \"{label}\": {{\n{}\n  }}", rows.join(",\n"))
    };

    let schema = [
        "{".to_string(),
        "  \"gw_captain\": \"Player Name\",".to_string(),
        "  \"captain_reason\": \"Why this player is the best captain choice\",".to_string(),
        "  \"differential\": \"Player Name\",".to_string(),
        "  \"differential_reason\": \"Why this low-owned player could be valuable\",".to_string(),
        format!("{},", side("transfers_in")),
        format!("{},", side("transfers_out")),
        "  \"general_advice\": \"Overall strategy for this gameweek\"".to_string(),
        "}".to_string(),
    ]
    .join("\n");

    let counts = Position::ALL
        .iter()
        .map(|p| format!("{} {}", PositionTransfers::required(*p), p.label()))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!(
        "{ADVISOR_PREAMBLE}\n{}\nTop players by position (ranked by form, then total points):\n{player_json}\n\n\
Provide your response in this exact JSON format:\n{schema}\n\n\
Rules:\n\
- transfers_in MUST contain exactly {counts}.\n\
- transfers_out MUST contain exactly {counts}.\n\
- Every pick MUST include name, team and reason.\n\
- Use only players from the data above for transfers_in.\n\
- Return ONLY the JSON object. No markdown, no prose.\n\n\
Focus on form, fixtures, and value. Keep it concise.",
        gameweek_line(gameweek)
    ))
}

fn gameweek_line(gameweek: Option<&Gameweek>) -> String {
    match gameweek {
        Some(gw) => match gw.deadline_time {
            Some(deadline) => format!(
                "Recommendations are for {} (deadline {} UTC).\n",
                gw.name,
                deadline.format("%Y-%m-%d %H:%M")
            ),
            None => format!("Recommendations are for {}.\n", gw.name),
        },
        None => String::new(),
    }
}
