//! Score engine.
//!
//! The [`Scorekeeper`] owns the match state, the undo history, and the
//! key-value store collaborator; it is the only writer. Every operation runs
//! to completion synchronously and persists the full state at the end, so a
//! presentation layer can re-read after each call.
//!
//! Invalid or duplicate input (a point after the match ended, an undo with
//! nothing to undo, a serve choice when none is pending) is a silent no-op,
//! never an error: the operations are driven by UI events and must shrug off
//! duplicates.

pub mod stats;

use crate::history::{History, HistoryEntry};
use crate::models::{PlayerId, Shot, ShotMethod, TeamId};
use crate::rally::{self, RallyAction, RallyNode, RallyStep, Resolution};
use crate::save::export::{self, MatchDocument};
use crate::save::store::{self, KeyValueStore};
use crate::save::SaveError;
use crate::state::MatchState;

/// What a point award did to the match, for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointOutcome {
    /// The match was already over; nothing changed.
    Ignored,
    /// Point recorded, set still running.
    Rally,
    /// The point closed a set.
    SetWon { winner: TeamId },
    /// The point closed set two at one set apiece: a manual serve choice is
    /// now pending and the collaborator must block scoring input until
    /// [`Scorekeeper::record_serve_choice`] is called.
    AwaitingServeChoice { set_winner: TeamId },
    /// The point decided the match.
    MatchWon { winner: TeamId },
}

/// Result of one rally-machine transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RallyOutcome {
    /// The action is not an edge of the current node; nothing changed.
    Rejected,
    /// The rally continues at the given node.
    Continues(RallyNode),
    /// The rally reached a point marker and was settled.
    PointSettled(PointOutcome),
}

/// Owns a match in progress and the store it persists to.
pub struct Scorekeeper<S: KeyValueStore> {
    pub state: MatchState,
    pub history: History,
    store: S,
}

impl<S: KeyValueStore> Scorekeeper<S> {
    /// Fresh match backed by `store`.
    pub fn new(store: S) -> Self {
        Self { state: MatchState::new(), history: History::new(), store }
    }

    /// Restore a match from whatever `store` holds; absent or unreadable
    /// keys fall back to fresh-match defaults.
    pub fn load(store: S) -> Self {
        let (state, history) = store::load_match(&store);
        Self { state, history, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Award a point to `player`, finished with `method`.
    ///
    /// The snapshot is pushed before the post-match guard, so a stray award
    /// after match end still deepens the history by one (undoing it is a
    /// no-op restore of the final state).
    pub fn award_point(&mut self, player: PlayerId, method: ShotMethod) -> PointOutcome {
        self.history.push(HistoryEntry::capture(&self.state));
        let outcome = self.apply_point(player, player, method);
        if outcome != PointOutcome::Ignored {
            self.persist();
        }
        outcome
    }

    /// Award the point that `committing_player`'s error concedes. The fixed
    /// opposite-team partner is credited with the point for score and serve
    /// purposes; the shot and stat line belong to the committing player.
    pub fn award_error_point(
        &mut self,
        committing_player: PlayerId,
        method: ShotMethod,
    ) -> PointOutcome {
        self.history.push(HistoryEntry::capture(&self.state));
        let scorer = committing_player.error_scoring_partner();
        let outcome = self.apply_point(scorer, committing_player, method);
        if outcome == PointOutcome::Ignored {
            return outcome;
        }
        if committing_player.team() == TeamId::Team2 {
            // TODO: confirm whether this ordering flip on away-side errors is
            // intended. Rally scoring recomputes the pairs right after a
            // point, so it only surfaces for direct error entry.
            self.state.rally.serving_pair.reverse();
        }
        self.persist();
        outcome
    }

    /// Record the manual third-set serve choice. No-op unless the match is
    /// actually waiting for one.
    pub fn record_serve_choice(&mut self, chosen_team: TeamId) {
        if !self.state.wait_for_serve_selection {
            log::debug!("serve choice ignored: none pending");
            return;
        }
        self.state.initial_serving_team = chosen_team;
        self.state.serving_team = chosen_team;
        self.state.wait_for_serve_selection = false;
        if self.state.skill_level == crate::models::SkillLevel::Intermediate {
            self.state.rally.reset_for(chosen_team);
        }
        log::info!("third-set serve: {}", chosen_team.as_str());
        self.persist();
    }

    /// Step back one snapshot. No-op when the history is empty.
    pub fn undo(&mut self) {
        match self.history.pop() {
            Some(entry) => {
                entry.restore_into(&mut self.state);
                self.persist();
            }
            None => log::debug!("undo ignored: history empty"),
        }
    }

    /// Start a new match, keeping names, format, skill level and the
    /// initial-serve choice. The undo history deliberately survives.
    pub fn reset(&mut self) {
        self.state.reset();
        log::info!("match reset ({})", self.state.format.as_str());
        self.persist();
    }

    /// The ordered transition options out of the current rally node, for
    /// display.
    pub fn rally_options(&self) -> Vec<(RallyAction, RallyNode)> {
        rally::transitions(self.state.rally.current_node)
    }

    /// Apply one rally transition. A snapshot is taken before every accepted
    /// transition, point-scoring or not, so mid-rally missteps undo one step
    /// at a time.
    pub fn apply_rally_action(&mut self, action: RallyAction) -> RallyOutcome {
        let node = self.state.rally.current_node;
        let Some(next) = rally::next_node(node, action) else {
            log::warn!("rally action {:?} is not an edge of {:?}", action, node);
            return RallyOutcome::Rejected;
        };

        self.history.push(HistoryEntry::capture(&self.state));
        self.state.rally.path.push(RallyStep { from: node, action, to: next });

        if !next.is_terminal() {
            self.state.rally.current_node = next;
            self.persist();
            return RallyOutcome::Continues(next);
        }

        let outcome = match rally::resolve_terminal(&self.state.rally, node, action) {
            Resolution::Point { player, method } => self.apply_point(player, player, method),
            Resolution::Fault { player, method } => {
                self.apply_point(player.error_scoring_partner(), player, method)
            }
        };

        let serving = self.state.serving_team;
        self.state.rally.reset_for(serving);
        self.persist();
        RallyOutcome::PointSettled(outcome)
    }

    /// Pretty-printed match document plus its conventional filename, dated
    /// with the given day.
    pub fn export_with_date(&self, date: time::Date) -> Result<(String, String), SaveError> {
        let document = MatchDocument::from_match(&self.state, &self.history);
        let json = export::to_pretty_json(&document)?;
        let filename = export::file_name(date, &self.state.player_names);
        Ok((filename, json))
    }

    /// Export dated today (UTC).
    pub fn export(&self) -> Result<(String, String), SaveError> {
        self.export_with_date(time::OffsetDateTime::now_utc().date())
    }

    /// Replace the match wholesale with an imported document. A document
    /// that fails to parse leaves the state completely untouched.
    pub fn import(&mut self, json: &str) -> Result<(), SaveError> {
        let document = export::parse_document(json)?;
        document.apply_to(&mut self.state, &mut self.history);
        log::info!("match document imported ({} shots)", self.state.shots.len());
        self.persist();
        Ok(())
    }

    /// Shared point core for direct awards, error awards, and rally
    /// settlement. The caller has already snapshotted.
    fn apply_point(
        &mut self,
        scoring_player: PlayerId,
        stat_player: PlayerId,
        method: ShotMethod,
    ) -> PointOutcome {
        let format = *self.state.format.spec();
        if self.state.current_set >= format.total_sets {
            log::debug!("point after match end ignored");
            return PointOutcome::Ignored;
        }

        let scoring_team = scoring_player.team();
        self.state.add_point(scoring_team);
        // Winner serves next: the rally-winning team keeps the serve.
        self.state.serving_team = scoring_team;
        self.state.record_shot(Shot { player: stat_player, method });

        let mut outcome = PointOutcome::Rally;

        if self.state.is_set_over() {
            let winner = self.state.current_set_leader();
            match winner {
                TeamId::Team1 => self.state.team1_set_wins += 1,
                TeamId::Team2 => self.state.team2_set_wins += 1,
            }
            self.state.current_set += 1;
            outcome = PointOutcome::SetWon { winner };

            let tied_decider = self.state.current_set == 2
                && self.state.current_set < format.total_sets
                && self.state.team1_set_wins == 1
                && self.state.team2_set_wins == 1;
            if tied_decider {
                // The serve for the decider is a manual choice; do not
                // auto-alternate here.
                self.state.wait_for_serve_selection = true;
                outcome = PointOutcome::AwaitingServeChoice { set_winner: winner };
            } else if self.state.current_set < format.total_sets {
                self.state.initial_serving_team = self.state.initial_serving_team.opponent();
                self.state.serving_team = self.state.initial_serving_team;
            }
        }

        if self.state.is_match_over() {
            // A 2-0 sweep skips set three; cap the index either way.
            self.state.current_set = format.total_sets;
            outcome = PointOutcome::MatchWon { winner: self.state.match_leader() };
        }

        outcome
    }

    fn persist(&mut self) {
        if let Err(err) = store::save_match(&self.state, &self.history, &mut self.store) {
            log::error!("failed to persist match state: {}", err);
        }
    }
}

#[cfg(test)]
mod tests;
