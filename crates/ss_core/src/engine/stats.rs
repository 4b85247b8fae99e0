//! Player stat aggregation.
//!
//! Pure derivation over an arbitrary slice of the shot log: one set's bucket,
//! the whole match, or anything in between. The same counts must come out of
//! the flat log and the concatenation of the per-set buckets.

use std::collections::BTreeMap;

use crate::models::{PlayerId, Shot, ShotMethod, TeamId};

/// Per-player and per-team counts for a given method set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsBreakdown {
    pub per_player: BTreeMap<PlayerId, BTreeMap<ShotMethod, u32>>,
    pub per_team: BTreeMap<TeamId, BTreeMap<ShotMethod, u32>>,
}

impl StatsBreakdown {
    pub fn player_count(&self, player: PlayerId, method: ShotMethod) -> u32 {
        self.per_player.get(&player).and_then(|m| m.get(&method)).copied().unwrap_or(0)
    }

    pub fn team_count(&self, team: TeamId, method: ShotMethod) -> u32 {
        self.per_team.get(&team).and_then(|m| m.get(&method)).copied().unwrap_or(0)
    }

    /// Column total for one player (all methods in the breakdown).
    pub fn player_total(&self, player: PlayerId) -> u32 {
        self.per_player.get(&player).map(|m| m.values().sum()).unwrap_or(0)
    }

    /// Column total for one team: the sum over its two players.
    pub fn team_total(&self, team: TeamId) -> u32 {
        team.players().iter().map(|&player| self.player_total(player)).sum()
    }
}

/// Tally `shots` per player per method, then derive team totals. Methods not
/// listed are ignored.
pub fn aggregate(shots: &[Shot], methods: &[ShotMethod]) -> StatsBreakdown {
    let mut per_player: BTreeMap<PlayerId, BTreeMap<ShotMethod, u32>> = BTreeMap::new();
    for shot in shots {
        if !methods.contains(&shot.method) {
            continue;
        }
        *per_player.entry(shot.player).or_default().entry(shot.method).or_insert(0) += 1;
    }

    let mut per_team: BTreeMap<TeamId, BTreeMap<ShotMethod, u32>> = BTreeMap::new();
    for team in [TeamId::Team1, TeamId::Team2] {
        let counts = per_team.entry(team).or_default();
        for &method in methods {
            let total: u32 = team
                .players()
                .iter()
                .filter_map(|player| per_player.get(player).and_then(|m| m.get(&method)))
                .sum();
            counts.insert(method, total);
        }
    }

    StatsBreakdown { per_player, per_team }
}

/// Format one stat cell as `count (percent%)`. A zero count or zero column
/// total renders as a literal `0` (no division, no NaN).
pub fn format_cell(value: u32, column_total: u32) -> String {
    if value == 0 || column_total == 0 {
        return "0".to_string();
    }
    let percentage = (100.0 * f64::from(value) / f64::from(column_total)).round() as u32;
    format!("{} ({}%)", value, percentage)
}

/// 4-character display abbreviation for table headers.
pub fn abbreviate(name: &str) -> String {
    name.chars().take(4).collect()
}
