//! Local high score leaderboard
//!
//! Top 10 finished runs, persisted in the key-value store. Shown when the
//! remote scoreboard is unreachable.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, KeyValueStore};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_name: String,
    pub score: u64,
    /// Level reached
    pub level: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Sorted by score descending; equal scores keep arrival order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "key_dash_leaderboard";

    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a finished run. Returns the rank achieved, if any.
    pub fn record(
        &mut self,
        player_name: &str,
        score: u64,
        level: u32,
        timestamp: f64,
    ) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries.insert(
            rank - 1,
            LeaderboardEntry {
                player_name: player_name.to_string(),
                score,
                level,
                timestamp,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn load(store: &dyn KeyValueStore) -> Self {
        let mut board: Leaderboard = persistence::load_json(store, Self::STORAGE_KEY);
        // Hand-edited entries may be out of order
        board.entries.sort_by(|a, b| b.score.cmp(&a.score));
        board.entries.truncate(MAX_HIGH_SCORES);
        log::info!("Loaded {} high scores", board.entries.len());
        board
    }

    pub fn save(&self, store: &dyn KeyValueStore) {
        if persistence::save_json(store, Self::STORAGE_KEY, self) {
            log::info!("High scores saved ({} entries)", self.entries.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{BrokenStore, MemoryStore};

    fn board_with(scores: &[u64]) -> Leaderboard {
        let mut board = Leaderboard::new();
        for (i, s) in scores.iter().enumerate() {
            board.record("p", *s, 1, i as f64);
        }
        board
    }

    #[test]
    fn test_zero_never_qualifies() {
        assert!(!Leaderboard::new().qualifies(0));
    }

    #[test]
    fn test_sorted_descending() {
        let board = board_with(&[50, 200, 100]);
        let scores: Vec<u64> = board.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![200, 100, 50]);
        assert_eq!(board.top_score(), Some(200));
    }

    #[test]
    fn test_ties_keep_earlier_first() {
        let mut board = Leaderboard::new();
        board.record("first", 100, 2, 1.0);
        assert_eq!(board.record("second", 100, 2, 2.0), Some(2));
        assert_eq!(board.entries[0].player_name, "first");
    }

    #[test]
    fn test_capped_at_max() {
        let scores: Vec<u64> = (1..=15).map(|s| s * 10).collect();
        let mut board = board_with(&scores);
        assert_eq!(board.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(board.entries.last().map(|e| e.score), Some(60));

        assert!(!board.qualifies(60));
        assert_eq!(board.record("late", 55, 1, 99.0), None);
        assert_eq!(board.potential_rank(1000), Some(1));
    }

    #[test]
    fn test_persist_roundtrip() {
        let store = MemoryStore::new();
        let board = board_with(&[30, 10]);
        board.save(&store);
        assert_eq!(Leaderboard::load(&store), board);
    }

    #[test]
    fn test_unavailable_storage_gives_empty_board() {
        let board = Leaderboard::load(&BrokenStore);
        assert!(board.is_empty());
        board.save(&BrokenStore);
    }
}
