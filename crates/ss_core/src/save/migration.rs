use crate::format::MatchFormat;
use crate::models::{Shot, TeamId};

/// Reconstruct per-set buckets from a flat shot log, for stores written
/// before `shotsBySet` existed.
///
/// Replays the log against the format's per-set targets, cutting a new
/// bucket each time a running tally reaches the current set's target.
/// Best-effort: the tallies credit each shot to the recorded player's own
/// team, so error shots (charged to the committer, scored by the opponent)
/// can shift a cut by a point. This matches how such logs were originally
/// interpreted and is only used when no bucket data exists at all.
pub fn rebuild_shots_by_set(shots: &[Shot], format: &MatchFormat) -> Vec<Vec<Shot>> {
    let mut buckets: Vec<Vec<Shot>> = vec![Vec::new(); format.total_sets];
    let mut set_index = 0usize;
    let mut team1_tally = 0u32;
    let mut team2_tally = 0u32;

    for shot in shots {
        if set_index < format.total_sets {
            let target = format.points_per_set[set_index];
            if team1_tally >= target || team2_tally >= target {
                set_index += 1;
                team1_tally = 0;
                team2_tally = 0;
            }
        }

        match shot.player.team() {
            TeamId::Team1 => team1_tally += 1,
            TeamId::Team2 => team2_tally += 1,
        }

        if set_index < format.total_sets {
            buckets[set_index].push(*shot);
        }
    }

    log::info!(
        "rebuilt {} per-set shot buckets from a flat log of {} shots",
        buckets.iter().filter(|bucket| !bucket.is_empty()).count(),
        shots.len()
    );
    buckets
}
