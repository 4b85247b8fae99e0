//! SandScore core: beach volleyball match scorekeeping.
//!
//! The crate is a UI-free engine: a [`Scorekeeper`] owns the match state,
//! applies score and rally events, keeps a bounded undo history, and
//! persists everything through a pluggable key-value store. Export/import
//! moves whole matches as JSON documents.
//!
//! Typical embedding:
//!
//! ```
//! use ss_core::{MemoryStore, PlayerId, Scorekeeper, ShotMethod};
//!
//! let mut keeper = Scorekeeper::new(MemoryStore::new());
//! keeper.award_point(PlayerId::Home1, ShotMethod::Attack);
//! keeper.award_error_point(PlayerId::Away2, ShotMethod::ErrorServe);
//! assert_eq!(keeper.state.team1_scores[0], 2);
//! keeper.undo();
//! assert_eq!(keeper.state.team1_scores[0], 1);
//! ```

pub mod engine;
pub mod format;
pub mod history;
pub mod models;
pub mod rally;
pub mod save;
pub mod state;

pub use engine::stats::{abbreviate, aggregate, format_cell, StatsBreakdown};
pub use engine::{PointOutcome, RallyOutcome, Scorekeeper};
pub use format::{FormatKey, MatchFormat};
pub use history::{History, HistoryEntry, HISTORY_CAPACITY};
pub use models::{PlayerId, PlayerNames, Shot, ShotMethod, SkillLevel, TeamId};
pub use rally::{
    PairSlot, RallyAction, RallyNode, RallyState, RallyStep, ReceptionQuality, Resolution,
};
pub use save::{KeyValueStore, MatchDocument, MemoryStore, SaveError};
pub use state::MatchState;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
