//! Match state.
//!
//! `MatchState` is the authoritative record of a match in progress. It is
//! owned by the [`Scorekeeper`](crate::engine::Scorekeeper) and mutated only
//! through score-engine operations and rally transitions; nothing here is a
//! process-wide singleton.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::format::FormatKey;
use crate::models::{PlayerId, PlayerNames, Shot, ShotMethod, SkillLevel, TeamId};
use crate::rally::RallyState;

/// Per-player, per-method shot counts. Sparse: methods a player has not used
/// carry no entry, matching the persisted shape.
pub type PlayerStatMap = BTreeMap<PlayerId, BTreeMap<ShotMethod, u32>>;

/// All four player keys present with empty counts, the shape a fresh match
/// persists.
pub fn empty_player_stats() -> PlayerStatMap {
    PlayerId::ALL.iter().map(|&player| (player, BTreeMap::new())).collect()
}

/// The authoritative mutable record of a match in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    /// Team1 point totals, one entry per set index.
    pub team1_scores: Vec<u32>,
    /// Team2 point totals, one entry per set index.
    pub team2_scores: Vec<u32>,
    pub team1_set_wins: u32,
    pub team2_set_wins: u32,
    /// 0-based set index; equals `total_sets` exactly when the match is over.
    pub current_set: usize,
    /// Entire-match shot log, append-only.
    pub shots: Vec<Shot>,
    /// The same shots bucketed per set, in the same relative order.
    pub shots_by_set: Vec<Vec<Shot>>,
    pub player_stats: PlayerStatMap,
    pub player_names: PlayerNames,
    pub format: FormatKey,
    pub skill_level: SkillLevel,
    /// Who serves the next rally.
    pub serving_team: TeamId,
    /// Who served first in the current set; drives between-set alternation.
    pub initial_serving_team: TeamId,
    /// True exactly while the third-set serve choice is pending.
    pub wait_for_serve_selection: bool,
    /// Rally-machine bookkeeping, meaningful at the intermediate tier.
    pub rally: RallyState,
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchState {
    /// Fresh match: all zeros, default names, short format, team1 serving.
    pub fn new() -> Self {
        let format = FormatKey::default();
        let total_sets = format.spec().total_sets;
        Self {
            team1_scores: vec![0; total_sets],
            team2_scores: vec![0; total_sets],
            team1_set_wins: 0,
            team2_set_wins: 0,
            current_set: 0,
            shots: Vec::new(),
            shots_by_set: vec![Vec::new(); total_sets],
            player_stats: empty_player_stats(),
            player_names: PlayerNames::default(),
            format,
            skill_level: SkillLevel::default(),
            serving_team: TeamId::Team1,
            initial_serving_team: TeamId::Team1,
            wait_for_serve_selection: false,
            rally: RallyState::for_serving_team(TeamId::Team1),
        }
    }

    /// Reinitialize for a new match. Names, format, skill level and the
    /// initial-serve choice survive; the serving team is re-seeded from that
    /// choice.
    pub fn reset(&mut self) {
        let names = self.player_names.clone();
        let format = self.format;
        let skill_level = self.skill_level;
        let initial_serving_team = self.initial_serving_team;

        *self = Self::new();
        self.player_names = names;
        self.format = format;
        self.skill_level = skill_level;
        self.initial_serving_team = initial_serving_team;
        self.serving_team = initial_serving_team;
        self.rally = RallyState::for_serving_team(initial_serving_team);
    }

    pub fn scores_for(&self, team: TeamId) -> &[u32] {
        match team {
            TeamId::Team1 => &self.team1_scores,
            TeamId::Team2 => &self.team2_scores,
        }
    }

    /// Add one point for `team` in the current set. Caller guards against
    /// the match being over.
    pub fn add_point(&mut self, team: TeamId) {
        match team {
            TeamId::Team1 => self.team1_scores[self.current_set] += 1,
            TeamId::Team2 => self.team2_scores[self.current_set] += 1,
        }
    }

    /// Append a shot to the flat log, the current set's bucket, and the
    /// committing/scoring player's stat line.
    pub fn record_shot(&mut self, shot: Shot) {
        self.shots.push(shot);
        self.shots_by_set[self.current_set].push(shot);
        *self
            .player_stats
            .entry(shot.player)
            .or_default()
            .entry(shot.method)
            .or_insert(0) += 1;
    }

    /// Win-by-N rule for the current set: a team reached the set's target
    /// and leads by at least the minimum difference.
    pub fn is_set_over(&self) -> bool {
        let format = self.format.spec();
        if self.current_set >= format.total_sets {
            return false;
        }
        let team1 = self.team1_scores[self.current_set];
        let team2 = self.team2_scores[self.current_set];
        let target = format.points_per_set[self.current_set];
        (team1 >= target || team2 >= target) && team1.abs_diff(team2) >= format.min_point_difference
    }

    pub fn is_match_over(&self) -> bool {
        let sets_to_win = self.format.spec().sets_to_win;
        self.team1_set_wins == sets_to_win || self.team2_set_wins == sets_to_win
    }

    /// Winner of the current set by score. Only meaningful when the set is
    /// over; a tie cannot close a set under the win-by-N rule.
    pub fn current_set_leader(&self) -> TeamId {
        if self.team1_scores[self.current_set] > self.team2_scores[self.current_set] {
            TeamId::Team1
        } else {
            TeamId::Team2
        }
    }

    pub fn match_leader(&self) -> TeamId {
        if self.team1_set_wins > self.team2_set_wins {
            TeamId::Team1
        } else {
            TeamId::Team2
        }
    }
}
