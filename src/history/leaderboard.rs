use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::types::HistoryRecord;

pub const DEFAULT_TOP: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub display_name: String,
    pub best_effectiveness: f64,
    pub submissions: usize,
}

/// Best effectiveness per display name, highest first, cut to `top`.
/// Equal scores are ordered by name.
pub fn leaderboard(records: &[HistoryRecord], top: usize) -> Vec<LeaderboardEntry> {
    let mut by_name: BTreeMap<&str, LeaderboardEntry> = BTreeMap::new();

    for record in records {
        by_name
            .entry(record.display_name.as_str())
            .and_modify(|entry| {
                entry.best_effectiveness = entry.best_effectiveness.max(record.effectiveness);
                entry.submissions += 1;
            })
            .or_insert_with(|| LeaderboardEntry {
                display_name: record.display_name.clone(),
                best_effectiveness: record.effectiveness,
                submissions: 1,
            });
    }

    let mut entries: Vec<LeaderboardEntry> = by_name.into_values().collect();
    // Stable sort keeps the BTreeMap's name order for ties
    entries.sort_by(|a, b| {
        b.best_effectiveness
            .partial_cmp(&a.best_effectiveness)
            .unwrap_or(Ordering::Equal)
    });
    entries.truncate(top);
    entries
}
