//! Snapshot-based undo.
//!
//! Every mutating operation captures a [`HistoryEntry`] before touching the
//! match state. The stack is bounded: once full, the oldest snapshot is
//! dropped, so undo depth is capped regardless of match length.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::models::{Shot, TeamId};
use crate::rally::{RallyNode, RallyStep};
use crate::state::{MatchState, PlayerStatMap};

/// Maximum number of undo snapshots retained.
pub const HISTORY_CAPACITY: usize = 50;

/// Deep copy of the undoable subset of the match state. Names, format and
/// skill level are configuration, not play, and are deliberately absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub team1_scores: Vec<u32>,
    pub team2_scores: Vec<u32>,
    pub team1_set_wins: u32,
    pub team2_set_wins: u32,
    pub current_set: usize,
    pub shots: Vec<Shot>,
    pub shots_by_set: Vec<Vec<Shot>>,
    pub player_stats: PlayerStatMap,
    pub serving_team: TeamId,
    pub initial_serving_team: TeamId,
    // Rally fields default for snapshots persisted before the rally tier.
    #[serde(default)]
    pub current_rally_node: RallyNode,
    #[serde(default)]
    pub rally_path: Vec<RallyStep>,
}

impl HistoryEntry {
    pub fn capture(state: &MatchState) -> Self {
        Self {
            team1_scores: state.team1_scores.clone(),
            team2_scores: state.team2_scores.clone(),
            team1_set_wins: state.team1_set_wins,
            team2_set_wins: state.team2_set_wins,
            current_set: state.current_set,
            shots: state.shots.clone(),
            shots_by_set: state.shots_by_set.clone(),
            player_stats: state.player_stats.clone(),
            serving_team: state.serving_team,
            initial_serving_team: state.initial_serving_team,
            current_rally_node: state.rally.current_node,
            rally_path: state.rally.path.clone(),
        }
    }

    /// Overwrite the captured fields in `state` in place. Everything not
    /// captured (names, format, serve-selection flag) is left untouched.
    pub fn restore_into(self, state: &mut MatchState) {
        state.team1_scores = self.team1_scores;
        state.team2_scores = self.team2_scores;
        state.team1_set_wins = self.team1_set_wins;
        state.team2_set_wins = self.team2_set_wins;
        state.current_set = self.current_set;
        state.shots = self.shots;
        state.shots_by_set = self.shots_by_set;
        state.player_stats = self.player_stats;
        state.serving_team = self.serving_team;
        state.initial_serving_team = self.initial_serving_team;
        state.rally.current_node = self.current_rally_node;
        state.rally.path = self.rally_path;
    }
}

/// Bounded snapshot stack (FIFO eviction at capacity).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_back(entry);
        if self.entries.len() > HISTORY_CAPACITY {
            self.entries.pop_front();
        }
    }

    /// Most recent snapshot, or `None` when there is nothing to undo.
    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop_back()
    }
}
