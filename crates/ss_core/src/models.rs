//! Core identifier and record types for a beach volleyball match.
//!
//! Wire names (serde renames) follow the key-value store and match-document
//! schema: lowercase player/team ids, camelCase shot methods.

use serde::{Deserialize, Serialize};

/// One of the four players on court. Two per team, fixed for the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerId {
    Home1,
    Home2,
    Away1,
    Away2,
}

impl PlayerId {
    pub const ALL: [PlayerId; 4] = [PlayerId::Home1, PlayerId::Home2, PlayerId::Away1, PlayerId::Away2];

    /// The team this player belongs to.
    pub fn team(self) -> TeamId {
        match self {
            PlayerId::Home1 | PlayerId::Home2 => TeamId::Team1,
            PlayerId::Away1 | PlayerId::Away2 => TeamId::Team2,
        }
    }

    /// The fixed opposite-team partner credited with the point when this
    /// player commits an error (home1<->away1, home2<->away2).
    pub fn error_scoring_partner(self) -> PlayerId {
        match self {
            PlayerId::Home1 => PlayerId::Away1,
            PlayerId::Home2 => PlayerId::Away2,
            PlayerId::Away1 => PlayerId::Home1,
            PlayerId::Away2 => PlayerId::Home2,
        }
    }

    /// Display name used when no custom name has been entered.
    pub fn default_name(self) -> &'static str {
        match self {
            PlayerId::Home1 => "Home1",
            PlayerId::Home2 => "Home2",
            PlayerId::Away1 => "Away1",
            PlayerId::Away2 => "Away2",
        }
    }
}

/// Home (team1) or away (team2) side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamId {
    Team1,
    Team2,
}

impl TeamId {
    pub fn opponent(self) -> TeamId {
        match self {
            TeamId::Team1 => TeamId::Team2,
            TeamId::Team2 => TeamId::Team1,
        }
    }

    /// The team's players in canonical order.
    pub fn players(self) -> [PlayerId; 2] {
        match self {
            TeamId::Team1 => [PlayerId::Home1, PlayerId::Home2],
            TeamId::Team2 => [PlayerId::Away1, PlayerId::Away2],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TeamId::Team1 => "team1",
            TeamId::Team2 => "team2",
        }
    }

    pub fn from_key(key: &str) -> Option<TeamId> {
        match key {
            "team1" => Some(TeamId::Team1),
            "team2" => Some(TeamId::Team2),
            _ => None,
        }
    }
}

/// How a rally ended, as recorded in the shot log. Error kinds are charged
/// against the player who committed the error, not the team that scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShotMethod {
    Attack,
    Attack2,
    Block,
    Ace,
    ErrorServe,
    ErrorRecept,
    ErrorAttack,
    ErrorDouble,
    ErrorNetTouch,
}

impl ShotMethod {
    /// All methods in display order (point endings first, then error kinds).
    pub const ALL: [ShotMethod; 9] = [
        ShotMethod::Attack,
        ShotMethod::Attack2,
        ShotMethod::Block,
        ShotMethod::Ace,
        ShotMethod::ErrorServe,
        ShotMethod::ErrorRecept,
        ShotMethod::ErrorAttack,
        ShotMethod::ErrorDouble,
        ShotMethod::ErrorNetTouch,
    ];

    pub fn is_error(self) -> bool {
        matches!(
            self,
            ShotMethod::ErrorServe
                | ShotMethod::ErrorRecept
                | ShotMethod::ErrorAttack
                | ShotMethod::ErrorDouble
                | ShotMethod::ErrorNetTouch
        )
    }

    /// Abbreviated label for stat-table rows.
    pub fn short_label(self) -> &'static str {
        match self {
            ShotMethod::Attack => "Atk",
            ShotMethod::Attack2 => "Atk2",
            ShotMethod::Block => "Blk",
            ShotMethod::Ace => "Ace",
            ShotMethod::ErrorServe => "Ser",
            ShotMethod::ErrorRecept => "Rec",
            ShotMethod::ErrorAttack => "Att",
            ShotMethod::ErrorDouble => "Dou",
            ShotMethod::ErrorNetTouch => "Net",
        }
    }
}

/// One recorded scoring-relevant action.
///
/// The player field is serialized as `team` for compatibility with the
/// store/document schema, which predates per-player attribution naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shot {
    #[serde(rename = "team")]
    pub player: PlayerId,
    pub method: ShotMethod,
}

/// Input workflow tier. Only `Intermediate` drives the rally state machine;
/// the other tiers score through direct award calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            SkillLevel::Beginner => "beginner",
            SkillLevel::Intermediate => "intermediate",
            SkillLevel::Advanced => "advanced",
        }
    }

    pub fn from_key(key: &str) -> Option<SkillLevel> {
        match key {
            "beginner" => Some(SkillLevel::Beginner),
            "intermediate" => Some(SkillLevel::Intermediate),
            "advanced" => Some(SkillLevel::Advanced),
            _ => None,
        }
    }
}

/// Display names for the four players. Blank entries fall back to defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerNames {
    pub home1: String,
    pub home2: String,
    pub away1: String,
    pub away2: String,
}

impl Default for PlayerNames {
    fn default() -> Self {
        Self {
            home1: PlayerId::Home1.default_name().to_string(),
            home2: PlayerId::Home2.default_name().to_string(),
            away1: PlayerId::Away1.default_name().to_string(),
            away2: PlayerId::Away2.default_name().to_string(),
        }
    }
}

impl PlayerNames {
    pub fn get(&self, player: PlayerId) -> &str {
        match player {
            PlayerId::Home1 => &self.home1,
            PlayerId::Home2 => &self.home2,
            PlayerId::Away1 => &self.away1,
            PlayerId::Away2 => &self.away2,
        }
    }

    /// Set a player's name; whitespace-only input falls back to the default.
    pub fn set(&mut self, player: PlayerId, name: &str) {
        let trimmed = name.trim();
        let value = if trimmed.is_empty() { player.default_name() } else { trimmed };
        let slot = match player {
            PlayerId::Home1 => &mut self.home1,
            PlayerId::Home2 => &mut self.home2,
            PlayerId::Away1 => &mut self.away1,
            PlayerId::Away2 => &mut self.away2,
        };
        *slot = value.to_string();
    }

    /// Replace blank entries with defaults. Applied after load/import.
    pub fn normalize(&mut self) {
        for player in PlayerId::ALL {
            if self.get(player).trim().is_empty() {
                self.set(player, "");
            }
        }
    }
}
