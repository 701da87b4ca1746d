use crate::ingest::types::Gameweek;
use chrono::{DateTime, Utc};

/// Picks the gameweek the recommendation is for: the provider's `is_next`
/// flag wins, otherwise the earliest unfinished gameweek whose deadline is
/// still ahead of `now_utc`. `None` once the season is over.
pub fn resolve_upcoming(events: &[Gameweek], now_utc: DateTime<Utc>) -> Option<Gameweek> {
    if let Some(next) = events.iter().find(|gw| gw.is_next) {
        return Some(next.clone());
    }

    events
        .iter()
        .filter(|gw| !gw.finished)
        .filter_map(|gw| gw.deadline_time.filter(|d| *d > now_utc).map(|d| (d, gw)))
        .min_by_key(|(deadline, _)| *deadline)
        .map(|(_, gw)| gw.clone())
}
