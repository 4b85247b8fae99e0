use proptest::prelude::*;

use super::*;
use crate::format::FormatKey;
use crate::history::HISTORY_CAPACITY;
use crate::models::SkillLevel;
use crate::rally::{PairSlot, ReceptionQuality};
use crate::save::store::{keys, MemoryStore};

fn keeper() -> Scorekeeper<MemoryStore> {
    Scorekeeper::new(MemoryStore::new())
}

/// Run a whole short-format set to 3-0 for `team` by awarding attacks to its
/// first player.
fn sweep_set(keeper: &mut Scorekeeper<MemoryStore>, team: TeamId) -> PointOutcome {
    let player = team.players()[0];
    let mut last = PointOutcome::Ignored;
    for _ in 0..3 {
        last = keeper.award_point(player, ShotMethod::Attack);
    }
    last
}

#[test]
fn test_winner_serves_next() {
    let mut keeper = keeper();
    assert_eq!(keeper.state.serving_team, TeamId::Team1);

    keeper.award_point(PlayerId::Away1, ShotMethod::Ace);
    assert_eq!(keeper.state.serving_team, TeamId::Team2);

    keeper.award_point(PlayerId::Home2, ShotMethod::Block);
    assert_eq!(keeper.state.serving_team, TeamId::Team1);
}

#[test]
fn test_set_win_alternates_initial_serve() {
    let mut keeper = keeper();
    let outcome = sweep_set(&mut keeper, TeamId::Team1);

    assert_eq!(outcome, PointOutcome::SetWon { winner: TeamId::Team1 });
    assert_eq!(keeper.state.team1_set_wins, 1);
    assert_eq!(keeper.state.current_set, 1);
    // Team1 served first in set one, so team2 opens set two.
    assert_eq!(keeper.state.initial_serving_team, TeamId::Team2);
    assert_eq!(keeper.state.serving_team, TeamId::Team2);
}

#[test]
fn test_win_by_two_keeps_set_alive() {
    let mut keeper = keeper();
    for _ in 0..2 {
        keeper.award_point(PlayerId::Home1, ShotMethod::Attack);
        keeper.award_point(PlayerId::Away1, ShotMethod::Attack);
    }
    // 2-2; target is 3 but the lead must be two.
    let outcome = keeper.award_point(PlayerId::Home1, ShotMethod::Attack);
    assert_eq!(outcome, PointOutcome::Rally);
    assert_eq!(keeper.state.team1_scores[0], 3);

    let outcome = keeper.award_point(PlayerId::Home1, ShotMethod::Attack);
    assert_eq!(outcome, PointOutcome::SetWon { winner: TeamId::Team1 });
    assert_eq!(keeper.state.team1_scores[0], 4);
}

#[test]
fn test_tied_decider_waits_for_serve_choice() {
    let mut keeper = keeper();
    sweep_set(&mut keeper, TeamId::Team1);
    let outcome = sweep_set(&mut keeper, TeamId::Team2);

    assert_eq!(outcome, PointOutcome::AwaitingServeChoice { set_winner: TeamId::Team2 });
    assert!(keeper.state.wait_for_serve_selection);
    assert_eq!(keeper.state.current_set, 2);

    keeper.record_serve_choice(TeamId::Team2);
    assert!(!keeper.state.wait_for_serve_selection);
    assert_eq!(keeper.state.serving_team, TeamId::Team2);
    assert_eq!(keeper.state.initial_serving_team, TeamId::Team2);
}

#[test]
fn test_serve_choice_without_pending_is_a_noop() {
    let mut keeper = keeper();
    keeper.record_serve_choice(TeamId::Team2);
    assert_eq!(keeper.state.serving_team, TeamId::Team1);
    assert_eq!(keeper.state.initial_serving_team, TeamId::Team1);
}

#[test]
fn test_sweep_ends_match_and_caps_set_index() {
    let mut keeper = keeper();
    sweep_set(&mut keeper, TeamId::Team1);
    let outcome = sweep_set(&mut keeper, TeamId::Team1);

    assert_eq!(outcome, PointOutcome::MatchWon { winner: TeamId::Team1 });
    assert_eq!(keeper.state.team1_set_wins, 2);
    // Set three never gets played; the index still lands on total_sets.
    assert_eq!(keeper.state.current_set, 3);
    assert!(keeper.state.is_match_over());
}

#[test]
fn test_points_after_match_end_are_ignored_but_snapshot() {
    let mut keeper = keeper();
    sweep_set(&mut keeper, TeamId::Team1);
    sweep_set(&mut keeper, TeamId::Team1);
    let depth = keeper.history.len();
    let before = HistoryEntry::capture(&keeper.state);

    let outcome = keeper.award_point(PlayerId::Away1, ShotMethod::Ace);
    assert_eq!(outcome, PointOutcome::Ignored);
    assert_eq!(HistoryEntry::capture(&keeper.state), before);
    // The snapshot goes in before the guard, so undo depth still grows.
    assert_eq!(keeper.history.len(), depth + 1);

    keeper.undo();
    assert_eq!(HistoryEntry::capture(&keeper.state), before);
}

#[test]
fn test_error_point_credits_opponent_and_charges_committer() {
    let mut keeper = keeper();
    let outcome = keeper.award_error_point(PlayerId::Home1, ShotMethod::ErrorServe);

    assert_eq!(outcome, PointOutcome::Rally);
    assert_eq!(keeper.state.team2_scores[0], 1);
    assert_eq!(keeper.state.team1_scores[0], 0);
    assert_eq!(keeper.state.serving_team, TeamId::Team2);
    // The stat line belongs to the player who made the error.
    assert_eq!(keeper.state.player_stats[&PlayerId::Home1][&ShotMethod::ErrorServe], 1);
    assert!(keeper.state.player_stats[&PlayerId::Away1].is_empty());
    assert_eq!(keeper.state.shots[0].player, PlayerId::Home1);
}

#[test]
fn test_away_error_flips_serving_pair_order() {
    let mut keeper = keeper();
    assert_eq!(keeper.state.rally.serving_pair, [PlayerId::Home1, PlayerId::Home2]);

    keeper.award_error_point(PlayerId::Away1, ShotMethod::ErrorNetTouch);
    assert_eq!(keeper.state.team1_scores[0], 1);
    assert_eq!(keeper.state.rally.serving_pair, [PlayerId::Home2, PlayerId::Home1]);

    // A home-side error leaves the stored pair ordering alone.
    let mut keeper = Scorekeeper::new(MemoryStore::new());
    keeper.award_error_point(PlayerId::Home2, ShotMethod::ErrorDouble);
    assert_eq!(keeper.state.rally.serving_pair, [PlayerId::Home1, PlayerId::Home2]);
}

#[test]
fn test_undo_restores_previous_snapshot() {
    let mut keeper = keeper();
    keeper.award_point(PlayerId::Home1, ShotMethod::Attack);
    let before = HistoryEntry::capture(&keeper.state);

    keeper.award_point(PlayerId::Away2, ShotMethod::Block);
    keeper.undo();

    assert_eq!(HistoryEntry::capture(&keeper.state), before);
    assert_eq!(keeper.state.team2_scores[0], 0);
    assert_eq!(keeper.state.shots.len(), 1);
}

#[test]
fn test_undo_with_empty_history_is_a_noop() {
    let mut keeper = keeper();
    let before = HistoryEntry::capture(&keeper.state);
    keeper.undo();
    assert_eq!(HistoryEntry::capture(&keeper.state), before);
}

#[test]
fn test_undo_depth_is_capped() {
    let mut keeper = keeper();
    keeper.state.format = FormatKey::Long;

    // Alternate awards so the lead never reaches two and the set runs long.
    for _ in 0..30 {
        keeper.award_point(PlayerId::Home1, ShotMethod::Attack);
        keeper.award_point(PlayerId::Away1, ShotMethod::Attack);
    }
    assert_eq!(keeper.state.team1_scores[0], 30);
    assert_eq!(keeper.history.len(), HISTORY_CAPACITY);

    for _ in 0..HISTORY_CAPACITY {
        keeper.undo();
    }
    // 60 awards, 50 snapshots kept: undo bottoms out 10 awards in.
    assert!(keeper.history.is_empty());
    assert_eq!(keeper.state.team1_scores[0], 5);
    assert_eq!(keeper.state.team2_scores[0], 5);
}

#[test]
fn test_reset_keeps_configuration_and_history() {
    let mut keeper = keeper();
    keeper.state.player_names.set(PlayerId::Home1, "Alice");
    keeper.award_point(PlayerId::Home1, ShotMethod::Attack);
    keeper.reset();

    assert_eq!(keeper.state.team1_scores, vec![0, 0, 0]);
    assert!(keeper.state.shots.is_empty());
    assert_eq!(keeper.state.player_names.get(PlayerId::Home1), "Alice");
    // The snapshot stack survives a reset so the reset itself stays undoable
    // through the last captured point.
    assert_eq!(keeper.history.len(), 1);
}

#[test]
fn test_short_match_scenario() {
    let mut keeper = keeper();
    keeper.award_point(PlayerId::Home1, ShotMethod::Attack);
    keeper.award_point(PlayerId::Home1, ShotMethod::Attack);
    keeper.award_point(PlayerId::Away1, ShotMethod::Ace);
    let outcome = keeper.award_point(PlayerId::Home1, ShotMethod::Attack);

    assert_eq!(outcome, PointOutcome::SetWon { winner: TeamId::Team1 });
    assert_eq!(keeper.state.team1_scores[0], 3);
    assert_eq!(keeper.state.team2_scores[0], 1);
    assert_eq!(keeper.state.team1_set_wins, 1);
    assert_eq!(keeper.state.current_set, 1);
    assert_eq!(keeper.state.player_stats[&PlayerId::Home1][&ShotMethod::Attack], 3);
    assert_eq!(keeper.state.player_stats[&PlayerId::Away1][&ShotMethod::Ace], 1);
}

#[test]
fn test_every_operation_persists() {
    let mut keeper = keeper();
    keeper.award_point(PlayerId::Home1, ShotMethod::Attack);
    assert_eq!(keeper.store().get(keys::TEAM1_SCORES).as_deref(), Some("[1,0,0]"));

    keeper.undo();
    assert_eq!(keeper.store().get(keys::TEAM1_SCORES).as_deref(), Some("[0,0,0]"));
}

#[test]
fn test_load_resumes_a_persisted_match() {
    let mut keeper = keeper();
    keeper.state.skill_level = SkillLevel::Advanced;
    keeper.award_point(PlayerId::Home1, ShotMethod::Attack);
    keeper.award_error_point(PlayerId::Away2, ShotMethod::ErrorRecept);

    let resumed = Scorekeeper::load(keeper.store().clone());
    assert_eq!(resumed.state.team1_scores, keeper.state.team1_scores);
    assert_eq!(resumed.state.shots, keeper.state.shots);
    assert_eq!(resumed.state.player_stats, keeper.state.player_stats);
    assert_eq!(resumed.state.skill_level, SkillLevel::Advanced);
    assert_eq!(resumed.history, keeper.history);
}

#[test]
fn test_rally_full_exchange_scores_serving_team() {
    let mut keeper = keeper();
    keeper.state.skill_level = SkillLevel::Intermediate;

    let steps = [
        RallyAction::Reception { receiver: PairSlot::First, quality: ReceptionQuality::Good },
        RallyAction::Attack { attacker: PairSlot::Second },
        RallyAction::Defense { defender: PairSlot::First },
        RallyAction::Attack { attacker: PairSlot::First },
    ];
    for action in steps {
        assert!(matches!(keeper.apply_rally_action(action), RallyOutcome::Continues(_)));
    }
    assert_eq!(keeper.state.rally.current_node, RallyNode::AttackByServingTeam);

    let outcome = keeper.apply_rally_action(RallyAction::WinningAttack);
    assert_eq!(outcome, RallyOutcome::PointSettled(PointOutcome::Rally));
    assert_eq!(keeper.state.team1_scores[0], 1);
    // The kill goes to the serving team's most recent attacker.
    assert_eq!(keeper.state.player_stats[&PlayerId::Home1][&ShotMethod::Attack], 1);
    // Machine restarts for the next rally, same server.
    assert_eq!(keeper.state.rally.current_node, RallyNode::Serve);
    assert!(keeper.state.rally.path.is_empty());
    assert_eq!(keeper.state.rally.serving_pair, [PlayerId::Home1, PlayerId::Home2]);
}

#[test]
fn test_rally_ace_scores_the_server() {
    let mut keeper = keeper();
    let outcome = keeper.apply_rally_action(RallyAction::Ace);
    assert_eq!(outcome, RallyOutcome::PointSettled(PointOutcome::Rally));
    assert_eq!(keeper.state.team1_scores[0], 1);
    assert_eq!(keeper.state.player_stats[&PlayerId::Home1][&ShotMethod::Ace], 1);
}

#[test]
fn test_rally_serve_error_rotates_serve() {
    let mut keeper = keeper();
    let outcome = keeper.apply_rally_action(RallyAction::ServeError);
    assert_eq!(outcome, RallyOutcome::PointSettled(PointOutcome::Rally));

    assert_eq!(keeper.state.team2_scores[0], 1);
    assert_eq!(keeper.state.player_stats[&PlayerId::Home1][&ShotMethod::ErrorAttack], 1);
    assert_eq!(keeper.state.serving_team, TeamId::Team2);
    assert_eq!(keeper.state.rally.serving_pair, [PlayerId::Away1, PlayerId::Away2]);
}

#[test]
fn test_rally_skunk_charges_the_receiver() {
    let mut keeper = keeper();
    let action =
        RallyAction::Reception { receiver: PairSlot::Second, quality: ReceptionQuality::Skunk };
    let outcome = keeper.apply_rally_action(action);

    assert_eq!(outcome, RallyOutcome::PointSettled(PointOutcome::Rally));
    assert_eq!(keeper.state.team1_scores[0], 1);
    assert_eq!(keeper.state.player_stats[&PlayerId::Away2][&ShotMethod::ErrorRecept], 1);
}

#[test]
fn test_rally_block_scores_the_blocker() {
    let mut keeper = keeper();
    keeper.apply_rally_action(RallyAction::Reception {
        receiver: PairSlot::First,
        quality: ReceptionQuality::Perfect,
    });
    keeper.apply_rally_action(RallyAction::Attack { attacker: PairSlot::First });

    // The receiving team attacks; a block belongs to the serving side.
    let outcome = keeper.apply_rally_action(RallyAction::Block { blocker: PairSlot::Second });
    assert_eq!(outcome, RallyOutcome::PointSettled(PointOutcome::Rally));
    assert_eq!(keeper.state.team1_scores[0], 1);
    assert_eq!(keeper.state.player_stats[&PlayerId::Home2][&ShotMethod::Block], 1);
}

#[test]
fn test_rally_rejects_non_edges_without_side_effects() {
    let mut keeper = keeper();
    let before = HistoryEntry::capture(&keeper.state);
    let depth = keeper.history.len();

    let outcome = keeper.apply_rally_action(RallyAction::WinningAttack);
    assert_eq!(outcome, RallyOutcome::Rejected);
    assert_eq!(HistoryEntry::capture(&keeper.state), before);
    assert_eq!(keeper.history.len(), depth);
}

#[test]
fn test_mid_rally_undo_steps_back_one_transition() {
    let mut keeper = keeper();
    keeper.apply_rally_action(RallyAction::Reception {
        receiver: PairSlot::First,
        quality: ReceptionQuality::Good,
    });
    keeper.apply_rally_action(RallyAction::Attack { attacker: PairSlot::Second });
    assert_eq!(keeper.state.rally.current_node, RallyNode::AttackByReceivingTeam);
    assert_eq!(keeper.state.rally.path.len(), 2);

    keeper.undo();
    assert_eq!(keeper.state.rally.current_node, RallyNode::Reception);
    assert_eq!(keeper.state.rally.path.len(), 1);

    keeper.undo();
    assert_eq!(keeper.state.rally.current_node, RallyNode::Serve);
    assert!(keeper.state.rally.path.is_empty());
}

#[test]
fn test_rally_options_match_the_current_node() {
    let keeper = keeper();
    let options = keeper.rally_options();
    // Serve offers ace, serve error, and eight graded receptions.
    assert_eq!(options.len(), 10);
    assert!(options.iter().all(|(action, to)| {
        crate::rally::next_node(RallyNode::Serve, *action) == Some(*to)
    }));
}

#[test]
fn test_export_import_roundtrip_through_keeper() {
    let mut keeper = keeper();
    keeper.state.player_names.set(PlayerId::Home1, "Alice");
    keeper.award_point(PlayerId::Home1, ShotMethod::Attack);
    keeper.award_error_point(PlayerId::Away1, ShotMethod::ErrorServe);

    let date = time::Date::from_calendar_date(2026, time::Month::August, 29).unwrap();
    let (filename, json) = keeper.export_with_date(date).unwrap();
    assert_eq!(filename, "2026-08-29_Alice_and_Home2_vs_Away1_and_Away2.json");

    let mut other = Scorekeeper::new(MemoryStore::new());
    other.import(&json).unwrap();
    assert_eq!(other.state.team1_scores, keeper.state.team1_scores);
    assert_eq!(other.state.shots, keeper.state.shots);
    assert_eq!(other.state.player_names, keeper.state.player_names);
    assert_eq!(other.history, keeper.history);
}

#[test]
fn test_failed_import_leaves_state_untouched() {
    let mut keeper = keeper();
    keeper.award_point(PlayerId::Home1, ShotMethod::Attack);
    let before = HistoryEntry::capture(&keeper.state);
    let depth = keeper.history.len();

    assert!(keeper.import("{ definitely not json").is_err());
    assert_eq!(HistoryEntry::capture(&keeper.state), before);
    assert_eq!(keeper.history.len(), depth);
}

fn arbitrary_award() -> impl Strategy<Value = (PlayerId, ShotMethod)> {
    (0..PlayerId::ALL.len(), 0..ShotMethod::ALL.len())
        .prop_map(|(player, method)| (PlayerId::ALL[player], ShotMethod::ALL[method]))
}

proptest! {
    #[test]
    fn prop_shot_views_stay_consistent(awards in prop::collection::vec(arbitrary_award(), 0..120)) {
        let mut keeper = Scorekeeper::new(MemoryStore::new());
        for (player, method) in awards {
            if method.is_error() {
                keeper.award_error_point(player, method);
            } else {
                keeper.award_point(player, method);
            }
        }
        let state = &keeper.state;

        // The flat log and the per-set buckets are two views of one record.
        let bucketed: usize = state.shots_by_set.iter().map(|bucket| bucket.len()).sum();
        prop_assert_eq!(state.shots.len(), bucketed);

        let flat: Vec<Shot> =
            state.shots_by_set.iter().flat_map(|bucket| bucket.iter().copied()).collect();
        prop_assert_eq!(
            stats::aggregate(&flat, &ShotMethod::ALL),
            stats::aggregate(&state.shots, &ShotMethod::ALL)
        );

        // Set bookkeeping: the set index counts finished sets until the
        // match ends, where it pins to the set count.
        if state.is_match_over() {
            prop_assert_eq!(state.current_set, 3);
        } else {
            prop_assert_eq!(
                (state.team1_set_wins + state.team2_set_wins) as usize,
                state.current_set
            );
        }

        // Stat lines always sum back to the shot log.
        let recorded: u32 = state.player_stats.values().flat_map(|m| m.values()).sum();
        prop_assert_eq!(recorded as usize, state.shots.len());
    }
}
