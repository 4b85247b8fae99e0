//! Flat key-value persistence.
//!
//! The store collaborator is a plain string-to-string map (the embedding
//! decides whether that is browser storage, a file, or memory). One key per
//! top-level match-state field: object-valued fields are JSON-encoded,
//! scalars are stored as their plain string form.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::format::FormatKey;
use crate::history::History;
use crate::models::{SkillLevel, TeamId};
use crate::rally::RallyState;
use crate::state::MatchState;

use super::error::SaveError;
use super::migration::rebuild_shots_by_set;

/// Store keys, one per persisted field.
pub mod keys {
    pub const TEAM1_SCORES: &str = "team1Scores";
    pub const TEAM2_SCORES: &str = "team2Scores";
    pub const TEAM1_SET_WINS: &str = "team1SetWins";
    pub const TEAM2_SET_WINS: &str = "team2SetWins";
    pub const CURRENT_SET: &str = "currentSet";
    pub const SHOTS: &str = "shots";
    pub const SHOTS_BY_SET: &str = "shotsBySet";
    pub const PLAYER_STATS: &str = "playerStats";
    pub const PLAYER_NAMES: &str = "playerNames";
    pub const GAME_FORMAT: &str = "gameFormat";
    pub const SKILL_LEVEL: &str = "skillLevel";
    pub const SERVING_TEAM: &str = "servingTeam";
    pub const INITIAL_SERVING_TEAM: &str = "initialServingTeam";
    pub const HISTORY: &str = "history";
    pub const WAIT_FOR_SERVE_SELECTION: &str = "waitForServeSelection";
}

/// The store seam. `put` always succeeds; a lossy backend is the
/// embedding's concern.
pub trait KeyValueStore {
    fn put(&mut self, key: &str, value: String);
    fn get(&self, key: &str) -> Option<String>;
}

/// In-memory store for tests and headless embeddings.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn put(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}

/// Write the full key set for the match.
pub fn save_match<S: KeyValueStore>(
    state: &MatchState,
    history: &History,
    store: &mut S,
) -> Result<(), SaveError> {
    put_json(store, keys::TEAM1_SCORES, &state.team1_scores)?;
    put_json(store, keys::TEAM2_SCORES, &state.team2_scores)?;
    store.put(keys::TEAM1_SET_WINS, state.team1_set_wins.to_string());
    store.put(keys::TEAM2_SET_WINS, state.team2_set_wins.to_string());
    store.put(keys::CURRENT_SET, state.current_set.to_string());
    put_json(store, keys::SHOTS, &state.shots)?;
    put_json(store, keys::SHOTS_BY_SET, &state.shots_by_set)?;
    put_json(store, keys::PLAYER_STATS, &state.player_stats)?;
    put_json(store, keys::PLAYER_NAMES, &state.player_names)?;
    store.put(keys::GAME_FORMAT, state.format.as_str().to_string());
    store.put(keys::SKILL_LEVEL, state.skill_level.as_str().to_string());
    store.put(keys::SERVING_TEAM, state.serving_team.as_str().to_string());
    store.put(keys::INITIAL_SERVING_TEAM, state.initial_serving_team.as_str().to_string());
    put_json(store, keys::HISTORY, history)?;
    store.put(keys::WAIT_FOR_SERVE_SELECTION, state.wait_for_serve_selection.to_string());

    log::debug!("match state persisted ({} shots)", state.shots.len());
    Ok(())
}

/// Rebuild a match from the store. Absent keys keep fresh-match defaults;
/// a key that fails to parse is treated as absent (with a warning), never as
/// a fatal failure.
pub fn load_match<S: KeyValueStore>(store: &S) -> (MatchState, History) {
    let mut state = MatchState::new();

    // Configuration first: names, format, skill tier.
    if let Some(names) = get_json(store, keys::PLAYER_NAMES) {
        state.player_names = names;
        state.player_names.normalize();
    }
    if let Some(raw) = store.get(keys::GAME_FORMAT) {
        match FormatKey::from_key(&raw) {
            Some(format) => state.format = format,
            None => log::warn!("unknown stored game format '{}', keeping default", raw),
        }
    }
    if let Some(raw) = store.get(keys::SKILL_LEVEL) {
        match SkillLevel::from_key(&raw) {
            Some(level) => state.skill_level = level,
            None => log::warn!("unknown stored skill level '{}', keeping default", raw),
        }
    }

    if let Some(team) = get_team(store, keys::SERVING_TEAM) {
        state.serving_team = team;
    }
    if let Some(team) = get_team(store, keys::INITIAL_SERVING_TEAM) {
        state.initial_serving_team = team;
    }

    if let Some(scores) = get_json(store, keys::TEAM1_SCORES) {
        state.team1_scores = scores;
    }
    if let Some(scores) = get_json(store, keys::TEAM2_SCORES) {
        state.team2_scores = scores;
    }
    if let Some(wins) = get_int(store, keys::TEAM1_SET_WINS) {
        state.team1_set_wins = wins;
    }
    if let Some(wins) = get_int(store, keys::TEAM2_SET_WINS) {
        state.team2_set_wins = wins;
    }
    if let Some(set) = get_int::<usize, _>(store, keys::CURRENT_SET) {
        state.current_set = set;
    }
    if let Some(shots) = get_json(store, keys::SHOTS) {
        state.shots = shots;
    }
    let had_buckets = match get_json(store, keys::SHOTS_BY_SET) {
        Some(buckets) => {
            state.shots_by_set = buckets;
            true
        }
        None => false,
    };
    if let Some(player_stats) = get_json(store, keys::PLAYER_STATS) {
        state.player_stats = player_stats;
    }
    state.wait_for_serve_selection =
        store.get(keys::WAIT_FOR_SERVE_SELECTION).as_deref() == Some("true");

    let history: History = get_json(store, keys::HISTORY).unwrap_or_default();

    // Normalize shapes against the format.
    let total_sets = state.format.spec().total_sets;
    state.team1_scores.resize(total_sets, 0);
    state.team2_scores.resize(total_sets, 0);
    state.shots_by_set.resize(total_sets, Vec::new());
    state.current_set = state.current_set.min(total_sets);

    // Legacy stores carry only the flat shot log.
    let buckets_empty = state.shots_by_set.iter().all(|bucket| bucket.is_empty());
    if (!had_buckets || buckets_empty) && !state.shots.is_empty() {
        state.shots_by_set = rebuild_shots_by_set(&state.shots, state.format.spec());
    }

    // The rally always restarts at serve on load; the store schema does not
    // carry mid-rally progress.
    state.rally = RallyState::for_serving_team(state.serving_team);

    (state, history)
}

fn put_json<S: KeyValueStore, T: Serialize>(
    store: &mut S,
    key: &str,
    value: &T,
) -> Result<(), SaveError> {
    store.put(key, serde_json::to_string(value)?);
    Ok(())
}

fn get_json<T: DeserializeOwned, S: KeyValueStore>(store: &S, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("stored key '{}' is unreadable ({}), using default", key, err);
            None
        }
    }
}

fn get_int<T: std::str::FromStr, S: KeyValueStore>(store: &S, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("stored key '{}' is not a number ('{}'), using default", key, raw);
            None
        }
    }
}

fn get_team<S: KeyValueStore>(store: &S, key: &str) -> Option<TeamId> {
    let raw = store.get(key)?;
    let team = TeamId::from_key(&raw);
    if team.is_none() {
        log::warn!("stored key '{}' holds an unknown team '{}', using default", key, raw);
    }
    team
}
