//! JSON-file backed collections for the learning journal.
//!
//! Each collection is a single top-level JSON array on disk. Reads load the
//! whole array; writes rewrite it.

pub mod errors;
pub mod metrics;
pub mod reflections;
pub mod scores;
pub mod store;

pub use errors::{StoreError, StoreResult};
pub use reflections::{Reflection, ReflectionBook, REFLECTION_DATE_FORMAT};
pub use scores::{
    rank_scores, score_from_value, Leaderboard, SnakeScore, MAX_SCORES, SCORE_DATE_FORMAT,
};
pub use store::{CorruptPolicy, FileInfo, JsonFileStore};

pub const REFLECTIONS_COLLECTION: &str = "reflections";
pub const SNAKE_SCORES_COLLECTION: &str = "snake_scores";

pub const REFLECTIONS_FILE: &str = "reflections.json";
pub const SNAKE_SCORES_FILE: &str = "snake_scores.json";

pub const ANONYMOUS: &str = "Anonymous";

/// Trimmed author name, falling back to [`ANONYMOUS`].
pub fn display_name(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => ANONYMOUS.to_string(),
    }
}
