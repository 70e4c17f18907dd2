use std::path::PathBuf;

use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::errors::{StoreError, StoreResult};
use crate::store::{CorruptPolicy, FileInfo, JsonFileStore};
use crate::{display_name, SNAKE_SCORES_COLLECTION};

/// Entries kept on the leaderboard after every insert.
pub const MAX_SCORES: usize = 10;

pub const SCORE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnakeScore {
    pub name: String,
    pub score: i64,
    pub date: String,
}

impl SnakeScore {
    pub fn new(name: Option<&str>, score: i64) -> Self {
        Self {
            name: display_name(name),
            score,
            date: Local::now().format(SCORE_DATE_FORMAT).to_string(),
        }
    }
}

/// Accepts integers, floats (truncated) and numeric strings. `null` counts as
/// an omitted score.
pub fn score_from_value(value: &Value) -> StoreResult<i64> {
    match value {
        Value::Null => Ok(0),
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().and_then(truncate))
            .ok_or(StoreError::InvalidScore),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(truncate))
                .ok_or(StoreError::InvalidScore)
        }
        _ => Err(StoreError::InvalidScore),
    }
}

fn truncate(value: f64) -> Option<i64> {
    if value.is_finite() && value.abs() < i64::MAX as f64 {
        Some(value.trunc() as i64)
    } else {
        None
    }
}

/// Orders by score, highest first. Equal scores keep their stored order.
pub fn rank_scores(scores: &mut [SnakeScore]) {
    scores.sort_by(|left, right| right.score.cmp(&left.score));
}

/// Top-N snake scores. The persisted array is always sorted and capped.
pub struct Leaderboard {
    store: JsonFileStore<SnakeScore>,
    capacity: usize,
}

impl Leaderboard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: JsonFileStore::new(path, SNAKE_SCORES_COLLECTION),
            capacity: MAX_SCORES,
        }
    }

    pub fn with_policy(self, policy: CorruptPolicy) -> Self {
        Self {
            store: self.store.with_policy(policy),
            ..self
        }
    }

    pub fn with_capacity(self, capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            ..self
        }
    }

    pub fn store(&self) -> &JsonFileStore<SnakeScore> {
        &self.store
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records a score and returns the 1-based rank it holds on the board,
    /// or `None` when it did not make the cut.
    pub fn add(&self, name: Option<&str>, score: i64) -> StoreResult<Option<usize>> {
        let entry = SnakeScore::new(name, score);
        let capacity = self.capacity;
        let rank = self.store.update(|scores| {
            let rank = scores.iter().filter(|held| held.score >= score).count() + 1;
            scores.push(entry.clone());
            rank_scores(scores);
            scores.truncate(capacity);
            Ok((rank <= capacity).then_some(rank))
        })?;
        info!(name = %entry.name, score, ?rank, "snake score recorded");
        Ok(rank)
    }

    pub fn list(&self) -> StoreResult<Vec<SnakeScore>> {
        let mut scores = self.store.load()?;
        rank_scores(&mut scores);
        Ok(scores)
    }

    pub fn file_info(&self) -> StoreResult<Option<FileInfo>> {
        self.store.file_info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn board() -> (tempfile::TempDir, Leaderboard) {
        let dir = tempdir().unwrap();
        let board = Leaderboard::new(dir.path().join("snake_scores.json"));
        (dir, board)
    }

    #[test]
    fn board_stays_sorted_and_capped() {
        let (_dir, board) = board();
        let inputs = [5, 40, 12, 3, 99, 40, 7, 0, 61, 18, 2, 33, 8, 71];
        for (count, score) in inputs.iter().enumerate() {
            board.add(Some("p"), *score).unwrap();

            let persisted = board.store().load().unwrap();
            assert_eq!(persisted.len(), (count + 1).min(MAX_SCORES));
            assert!(persisted
                .windows(2)
                .all(|pair| pair[0].score >= pair[1].score));
        }
        let top: Vec<i64> = board.list().unwrap().iter().map(|s| s.score).collect();
        assert_eq!(top, vec![99, 71, 61, 40, 40, 33, 18, 12, 8, 7]);
    }

    #[test]
    fn rank_reports_position_or_miss() {
        let (_dir, board) = board();
        let board = board.with_capacity(3);
        assert_eq!(board.add(Some("a"), 10).unwrap(), Some(1));
        assert_eq!(board.add(Some("b"), 20).unwrap(), Some(1));
        assert_eq!(board.add(Some("c"), 10).unwrap(), Some(3));
        assert_eq!(board.add(Some("d"), 1).unwrap(), None);
        assert_eq!(board.list().unwrap().len(), 3);
    }

    #[test]
    fn equal_scores_keep_arrival_order() {
        let (_dir, board) = board();
        board.add(Some("first"), 50).unwrap();
        board.add(Some("second"), 50).unwrap();
        let names: Vec<String> = board.list().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn defaults_apply_for_missing_fields() {
        let entry = SnakeScore::new(None, 0);
        assert_eq!(entry.name, "Anonymous");
        assert_eq!(entry.score, 0);
        assert_eq!(entry.date.len(), "2026-10-19 12:00:00".len());
    }

    #[test]
    fn list_resorts_hand_edited_files() {
        let (_dir, board) = board();
        std::fs::write(
            board.store().path(),
            json!([
                {"name": "low", "score": 1, "date": "2026-01-01 00:00:00"},
                {"name": "high", "score": 9, "date": "2026-01-01 00:00:00"}
            ])
            .to_string(),
        )
        .unwrap();
        let names: Vec<String> = board.list().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["high", "low"]);
    }

    #[test]
    fn list_keeps_oversized_files_whole_until_next_add() {
        let (_dir, board) = board();
        let entries: Vec<SnakeScore> = (0..12).map(|n| SnakeScore::new(Some("p"), n)).collect();
        std::fs::write(board.store().path(), serde_json::to_string(&entries).unwrap()).unwrap();

        let listed = board.list().unwrap();
        assert_eq!(listed.len(), 12);
        assert_eq!(listed[0].score, 11);
        assert_eq!(listed[11].score, 0);

        board.add(Some("q"), 5).unwrap();
        assert_eq!(board.list().unwrap().len(), MAX_SCORES);
    }

    #[test]
    fn score_coercion() {
        assert_eq!(score_from_value(&json!(12)).unwrap(), 12);
        assert_eq!(score_from_value(&json!(12.9)).unwrap(), 12);
        assert_eq!(score_from_value(&json!(" 31 ")).unwrap(), 31);
        assert_eq!(score_from_value(&json!("4.5")).unwrap(), 4);
        assert_eq!(score_from_value(&Value::Null).unwrap(), 0);
        assert!(score_from_value(&json!("lots")).is_err());
        assert!(score_from_value(&json!(true)).is_err());
        assert!(score_from_value(&json!([1])).is_err());
    }
}
