//! JSON match-document export and import.
//!
//! A [`MatchDocument`] is the whole match in one self-describing JSON object,
//! for backup and transfer between devices. Import replaces the running
//! match wholesale; a document that fails to parse changes nothing.

use serde::{Deserialize, Serialize};

use crate::format::FormatKey;
use crate::history::History;
use crate::models::{PlayerId, PlayerNames, Shot, SkillLevel, TeamId};
use crate::rally::{RallyNode, RallyState, RallyStep};
use crate::state::{MatchState, PlayerStatMap};

use super::error::SaveError;
use super::migration::rebuild_shots_by_set;

/// One exported match. Field names mirror the key-value store schema, so a
/// document reads like a dump of the store keys. The container-level default
/// keeps older documents (written before the rally tier) importable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchDocument {
    pub team1_scores: Vec<u32>,
    pub team2_scores: Vec<u32>,
    pub team1_set_wins: u32,
    pub team2_set_wins: u32,
    pub current_set: usize,
    pub shots: Vec<Shot>,
    pub shots_by_set: Vec<Vec<Shot>>,
    pub player_stats: PlayerStatMap,
    pub player_names: PlayerNames,
    pub game_format: FormatKey,
    pub skill_level: SkillLevel,
    pub serving_team: TeamId,
    pub initial_serving_team: TeamId,
    pub wait_for_serve_selection: bool,
    pub history: History,
    pub current_rally_state: RallyNode,
    pub rally_path: Vec<RallyStep>,
    /// Serving pair by id, index order significant. Empty in older documents.
    #[serde(default)]
    pub serving_players: Vec<PlayerId>,
    #[serde(default)]
    pub receiving_players: Vec<PlayerId>,
}

impl Default for MatchDocument {
    fn default() -> Self {
        Self::from_match(&MatchState::new(), &History::new())
    }
}

impl MatchDocument {
    /// Snapshot the running match (undo history included).
    pub fn from_match(state: &MatchState, history: &History) -> Self {
        Self {
            team1_scores: state.team1_scores.clone(),
            team2_scores: state.team2_scores.clone(),
            team1_set_wins: state.team1_set_wins,
            team2_set_wins: state.team2_set_wins,
            current_set: state.current_set,
            shots: state.shots.clone(),
            shots_by_set: state.shots_by_set.clone(),
            player_stats: state.player_stats.clone(),
            player_names: state.player_names.clone(),
            game_format: state.format,
            skill_level: state.skill_level,
            serving_team: state.serving_team,
            initial_serving_team: state.initial_serving_team,
            wait_for_serve_selection: state.wait_for_serve_selection,
            history: history.clone(),
            current_rally_state: state.rally.current_node,
            rally_path: state.rally.path.clone(),
            serving_players: state.rally.serving_pair.to_vec(),
            receiving_players: state.rally.receiving_pair.to_vec(),
        }
    }

    /// Overwrite `state` and `history` with the document's contents, with
    /// the same shape normalization a store load applies.
    pub fn apply_to(self, state: &mut MatchState, history: &mut History) {
        *state = MatchState::new();
        state.team1_scores = self.team1_scores;
        state.team2_scores = self.team2_scores;
        state.team1_set_wins = self.team1_set_wins;
        state.team2_set_wins = self.team2_set_wins;
        state.current_set = self.current_set;
        state.shots = self.shots;
        state.shots_by_set = self.shots_by_set;
        state.player_stats = self.player_stats;
        state.player_names = self.player_names;
        state.player_names.normalize();
        state.format = self.game_format;
        state.skill_level = self.skill_level;
        state.serving_team = self.serving_team;
        state.initial_serving_team = self.initial_serving_team;
        state.wait_for_serve_selection = self.wait_for_serve_selection;

        let total_sets = state.format.spec().total_sets;
        state.team1_scores.resize(total_sets, 0);
        state.team2_scores.resize(total_sets, 0);
        state.shots_by_set.resize(total_sets, Vec::new());
        state.current_set = state.current_set.min(total_sets);

        let buckets_empty = state.shots_by_set.iter().all(|bucket| bucket.is_empty());
        if buckets_empty && !state.shots.is_empty() {
            state.shots_by_set = rebuild_shots_by_set(&state.shots, state.format.spec());
        }

        state.rally = RallyState::for_serving_team(state.serving_team);
        state.rally.current_node = self.current_rally_state;
        state.rally.path = self.rally_path;
        // Pair arrays only when the document carries both players; anything
        // else keeps the pairs recomputed from the serving team.
        if let [first, second] = self.serving_players[..] {
            state.rally.serving_pair = [first, second];
        }
        if let [first, second] = self.receiving_players[..] {
            state.rally.receiving_pair = [first, second];
        }
        // The intermediate tier trusts the serving team over any stored pair
        // ordering once a match changes hands.
        if state.skill_level == SkillLevel::Intermediate {
            state.rally.recompute_pairs(state.serving_team);
        }

        *history = self.history;
    }
}

/// Parse an exported document. Any JSON or schema problem is an
/// [`SaveError::InvalidDocument`]; the caller's state is untouched.
pub fn parse_document(json: &str) -> Result<MatchDocument, SaveError> {
    serde_json::from_str(json).map_err(|err| SaveError::InvalidDocument(err.to_string()))
}

pub fn to_pretty_json(document: &MatchDocument) -> Result<String, SaveError> {
    Ok(serde_json::to_string_pretty(document)?)
}

/// Conventional export filename:
/// `YYYY-MM-DD_<home1>_and_<home2>_vs_<away1>_and_<away2>.json`.
pub fn file_name(date: time::Date, names: &PlayerNames) -> String {
    format!(
        "{:04}-{:02}-{:02}_{}_and_{}_vs_{}_and_{}.json",
        date.year(),
        u8::from(date.month()),
        date.day(),
        names.get(PlayerId::Home1),
        names.get(PlayerId::Home2),
        names.get(PlayerId::Away1),
        names.get(PlayerId::Away2),
    )
}
