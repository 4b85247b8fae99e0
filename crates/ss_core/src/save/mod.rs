// Persistence for SandScore matches
// Flat key-value store schema plus JSON match-document export/import

pub mod error;
pub mod export;
pub mod migration;
pub mod store;

pub use error::SaveError;
pub use export::MatchDocument;
pub use migration::rebuild_shots_by_set;
pub use store::{KeyValueStore, MemoryStore};
