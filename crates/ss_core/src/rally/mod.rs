//! Rally state machine for the intermediate skill tier.
//!
//! A rally is a path through a small directed graph of typed actions rooted
//! at [`RallyNode::Serve`]. Attack/defense nodes can loop between the two
//! sides; every other edge converges on one of the two absorbing point
//! markers, at which point the rally is settled through the score engine and
//! the machine restarts at `Serve` with the player pairs recomputed from the
//! (possibly just rotated) serving team.

use serde::{Deserialize, Serialize};

use crate::models::{PlayerId, ShotMethod, TeamId};

/// Node of the rally graph. `PointToServingTeam`/`PointToReceivingTeam` are
/// the absorbing terminal markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RallyNode {
    #[default]
    Serve,
    Reception,
    AttackByReceivingTeam,
    DefenseByServingTeam,
    AttackByServingTeam,
    DefenseByReceivingTeam,
    PointToServingTeam,
    PointToReceivingTeam,
}

impl RallyNode {
    pub fn is_terminal(self) -> bool {
        matches!(self, RallyNode::PointToServingTeam | RallyNode::PointToReceivingTeam)
    }
}

/// Index into a serving or receiving pair. Actions name players relative to
/// the pair, not as literal court slots; the pair arrays do the remapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairSlot {
    First,
    Second,
}

impl PairSlot {
    pub const BOTH: [PairSlot; 2] = [PairSlot::First, PairSlot::Second];

    pub fn index(self) -> usize {
        match self {
            PairSlot::First => 0,
            PairSlot::Second => 1,
        }
    }
}

/// Reception grading. `Skunk` (R=) is an outright reception error and ends
/// the rally in the serving team's favor; the other grades keep it alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceptionQuality {
    Good,
    Poor,
    Skunk,
    Perfect,
}

impl ReceptionQuality {
    /// Grades in display order, matching the label row R!, R-, R=, R+.
    pub const ALL: [ReceptionQuality; 4] = [
        ReceptionQuality::Good,
        ReceptionQuality::Poor,
        ReceptionQuality::Skunk,
        ReceptionQuality::Perfect,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ReceptionQuality::Good => "R!",
            ReceptionQuality::Poor => "R-",
            ReceptionQuality::Skunk => "R=",
            ReceptionQuality::Perfect => "R+",
        }
    }
}

/// A labeled transition out of a rally node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RallyAction {
    Ace,
    ServeError,
    Reception { receiver: PairSlot, quality: ReceptionQuality },
    Attack { attacker: PairSlot },
    WinningAttack,
    Block { blocker: PairSlot },
    AttackError,
    Defense { defender: PairSlot },
}

/// One applied transition, kept so mid-rally undo and terminal attribution
/// can see how the rally unfolded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RallyStep {
    pub from: RallyNode,
    pub action: RallyAction,
    pub to: RallyNode,
}

/// Live rally bookkeeping carried inside the match state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RallyState {
    pub current_node: RallyNode,
    pub path: Vec<RallyStep>,
    /// Serving team's players; index 0/1 are the graph-relative Player1/2.
    pub serving_pair: [PlayerId; 2],
    /// Receiving team's players; index 0/1 are the graph-relative Player3/4.
    pub receiving_pair: [PlayerId; 2],
}

impl Default for RallyState {
    fn default() -> Self {
        Self::for_serving_team(TeamId::Team1)
    }
}

impl RallyState {
    pub fn for_serving_team(serving: TeamId) -> Self {
        Self {
            current_node: RallyNode::Serve,
            path: Vec::new(),
            serving_pair: serving.players(),
            receiving_pair: serving.opponent().players(),
        }
    }

    /// Restart at `Serve` for the next rally.
    pub fn reset_for(&mut self, serving: TeamId) {
        *self = Self::for_serving_team(serving);
    }

    /// Recompute both pairs from the serving team without touching the
    /// current node or path (used after import).
    pub fn recompute_pairs(&mut self, serving: TeamId) {
        self.serving_pair = serving.players();
        self.receiving_pair = serving.opponent().players();
    }
}

/// The semantic transition table. Returns `None` when the action is not an
/// edge of the given node.
pub fn next_node(node: RallyNode, action: RallyAction) -> Option<RallyNode> {
    use RallyAction as A;
    use RallyNode as N;

    match (node, action) {
        (N::Serve, A::Ace) => Some(N::PointToServingTeam),
        (N::Serve, A::ServeError) => Some(N::PointToReceivingTeam),
        (N::Serve, A::Reception { quality: ReceptionQuality::Skunk, .. }) => {
            Some(N::PointToServingTeam)
        }
        (N::Serve, A::Reception { .. }) => Some(N::Reception),

        (N::Reception, A::Attack { .. }) => Some(N::AttackByReceivingTeam),

        (N::AttackByReceivingTeam, A::WinningAttack) => Some(N::PointToReceivingTeam),
        (N::AttackByReceivingTeam, A::Block { .. }) => Some(N::PointToServingTeam),
        (N::AttackByReceivingTeam, A::AttackError) => Some(N::PointToServingTeam),
        (N::AttackByReceivingTeam, A::Defense { .. }) => Some(N::DefenseByServingTeam),

        (N::DefenseByServingTeam, A::Attack { .. }) => Some(N::AttackByServingTeam),

        (N::AttackByServingTeam, A::WinningAttack) => Some(N::PointToServingTeam),
        (N::AttackByServingTeam, A::Block { .. }) => Some(N::PointToReceivingTeam),
        (N::AttackByServingTeam, A::AttackError) => Some(N::PointToReceivingTeam),
        (N::AttackByServingTeam, A::Defense { .. }) => Some(N::DefenseByReceivingTeam),

        (N::DefenseByReceivingTeam, A::Attack { .. }) => Some(N::AttackByReceivingTeam),

        _ => None,
    }
}

/// Ordered option list for a node, for presentation. Order matters only for
/// display; semantics live in [`next_node`].
pub fn transitions(node: RallyNode) -> Vec<(RallyAction, RallyNode)> {
    use RallyAction as A;
    use RallyNode as N;

    let actions: Vec<RallyAction> = match node {
        N::Serve => {
            let mut actions = vec![A::Ace, A::ServeError];
            for receiver in PairSlot::BOTH {
                for quality in ReceptionQuality::ALL {
                    actions.push(A::Reception { receiver, quality });
                }
            }
            actions
        }
        N::Reception | N::DefenseByServingTeam | N::DefenseByReceivingTeam => {
            PairSlot::BOTH.iter().map(|&attacker| A::Attack { attacker }).collect()
        }
        N::AttackByReceivingTeam | N::AttackByServingTeam => {
            let mut actions = vec![A::WinningAttack];
            actions.extend(PairSlot::BOTH.iter().map(|&blocker| A::Block { blocker }));
            actions.push(A::AttackError);
            actions.extend(PairSlot::BOTH.iter().map(|&defender| A::Defense { defender }));
            actions
        }
        N::PointToServingTeam | N::PointToReceivingTeam => Vec::new(),
    };

    actions
        .into_iter()
        .filter_map(|action| next_node(node, action).map(|to| (action, to)))
        .collect()
}

/// How a terminal marker settles: a point credited to a player, or a fault
/// charged against the player who committed it (the opposing side scores).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Point { player: PlayerId, method: ShotMethod },
    Fault { player: PlayerId, method: ShotMethod },
}

/// Resolve which literal player and shot method a terminal transition maps
/// to. Actions that do not name a player resolve to the most recent attacker
/// on the path, falling back to pair index 0 (lenient default so the rally
/// workflow can never get stuck).
pub fn resolve_terminal(rally: &RallyState, from: RallyNode, action: RallyAction) -> Resolution {
    use RallyAction as A;

    match action {
        A::Ace => Resolution::Point { player: rally.serving_pair[0], method: ShotMethod::Ace },
        A::ServeError => {
            Resolution::Fault { player: rally.serving_pair[0], method: ShotMethod::ErrorAttack }
        }
        A::Reception { receiver, .. } => Resolution::Fault {
            player: rally.receiving_pair[receiver.index()],
            method: ShotMethod::ErrorRecept,
        },
        A::Block { blocker } => {
            // Blockers belong to the side defending the attack node.
            let pair = match from {
                RallyNode::AttackByReceivingTeam => rally.serving_pair,
                _ => rally.receiving_pair,
            };
            Resolution::Point { player: pair[blocker.index()], method: ShotMethod::Block }
        }
        A::WinningAttack => {
            let pair = attacking_pair(rally, from);
            Resolution::Point { player: last_attacker(rally).unwrap_or(pair[0]), method: ShotMethod::Attack }
        }
        A::AttackError => {
            let pair = attacking_pair(rally, from);
            Resolution::Fault {
                player: last_attacker(rally).unwrap_or(pair[0]),
                method: ShotMethod::ErrorAttack,
            }
        }
        // Defense and mid-rally attacks never terminate; resolve leniently.
        A::Attack { .. } | A::Defense { .. } => {
            log::warn!("non-terminal rally action resolved at a point marker: {:?}", action);
            Resolution::Point { player: rally.serving_pair[0], method: ShotMethod::Attack }
        }
    }
}

fn attacking_pair(rally: &RallyState, from: RallyNode) -> [PlayerId; 2] {
    match from {
        RallyNode::AttackByServingTeam => rally.serving_pair,
        _ => rally.receiving_pair,
    }
}

/// The player who made the most recent attack on the path, mapped through
/// the pair the attack originated from.
fn last_attacker(rally: &RallyState) -> Option<PlayerId> {
    rally.path.iter().rev().find_map(|step| match step.action {
        RallyAction::Attack { attacker } => {
            let pair = match step.from {
                RallyNode::DefenseByServingTeam => rally.serving_pair,
                _ => rally.receiving_pair,
            };
            Some(pair[attacker.index()])
        }
        _ => None,
    })
}
