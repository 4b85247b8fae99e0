//! Scoring-format table.
//!
//! Two canonical formats exist: the full beach format (21/21/15) and a short
//! practice format (3/3/3). Both are best of three, win by two.

use serde::{Deserialize, Serialize};

/// Parameters of one scoring format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchFormat {
    /// Sets needed to win the match.
    pub sets_to_win: u32,
    /// Point target per set index.
    pub points_per_set: [u32; 3],
    /// Minimum lead required to close a set.
    pub min_point_difference: u32,
    /// Number of sets the scoreboard allocates.
    pub total_sets: usize,
}

const LONG: MatchFormat = MatchFormat {
    sets_to_win: 2,
    points_per_set: [21, 21, 15],
    min_point_difference: 2,
    total_sets: 3,
};

const SHORT: MatchFormat = MatchFormat {
    sets_to_win: 2,
    points_per_set: [3, 3, 3],
    min_point_difference: 2,
    total_sets: 3,
};

/// Selectable scoring format. Wire names match the store's `gameFormat` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FormatKey {
    #[serde(rename = "21-21-15")]
    Long,
    #[default]
    #[serde(rename = "3-3-3")]
    Short,
}

impl FormatKey {
    /// Format Table lookup. Infallible: the key set is closed.
    pub fn spec(self) -> &'static MatchFormat {
        match self {
            FormatKey::Long => &LONG,
            FormatKey::Short => &SHORT,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FormatKey::Long => "21-21-15",
            FormatKey::Short => "3-3-3",
        }
    }

    pub fn from_key(key: &str) -> Option<FormatKey> {
        match key {
            "21-21-15" => Some(FormatKey::Long),
            "3-3-3" => Some(FormatKey::Short),
            _ => None,
        }
    }
}
