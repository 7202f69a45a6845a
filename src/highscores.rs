//! High score leaderboard
//!
//! Kept in memory by the score sync as the local-only fallback, and written
//! to disk by the file-backed score service.

use serde::{Deserialize, Serialize};

use crate::persistence::{BestScore, ScoreRecord};
use crate::settings::Difficulty;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Name used when the player has not set one
pub const ANONYMOUS: &str = "Anonymous";

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub player_name: String,
    /// Final score (after the accuracy multiplier)
    pub score: u64,
    /// Wave reached
    pub wave: u32,
    pub accuracy: f64,
    pub difficulty: Difficulty,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

impl From<&ScoreRecord> for HighScoreEntry {
    fn from(record: &ScoreRecord) -> Self {
        Self {
            player_name: record
                .player_name
                .clone()
                .unwrap_or_else(|| ANONYMOUS.to_string()),
            score: record.score,
            wave: record.wave,
            accuracy: record.accuracy,
            difficulty: record.difficulty,
            timestamp: record.timestamp,
        }
    }
}

/// High score leaderboard, sorted by score descending
///
/// Boards from [`HighScores::new`] keep the best [`MAX_HIGH_SCORES`] per
/// difficulty. Unbounded boards keep every game; that is what deserialising
/// yields, so stored history is never trimmed on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
    #[serde(skip)]
    per_difficulty_cap: Option<usize>,
}

impl Default for HighScores {
    fn default() -> Self {
        Self::new()
    }
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            per_difficulty_cap: Some(MAX_HIGH_SCORES),
        }
    }

    /// Empty leaderboard that never drops a game
    pub fn unbounded() -> Self {
        Self {
            entries: Vec::new(),
            per_difficulty_cap: None,
        }
    }

    fn scores_for(&self, difficulty: Difficulty) -> impl Iterator<Item = u64> + '_ {
        self.entries
            .iter()
            .filter(move |e| e.difficulty == difficulty)
            .map(|e| e.score)
    }

    /// Check if a score qualifies for its difficulty's board
    pub fn qualifies(&self, difficulty: Difficulty, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        let Some(cap) = self.per_difficulty_cap else {
            return true;
        };
        let mut count = 0;
        let mut lowest = None;
        for s in self.scores_for(difficulty) {
            count += 1;
            lowest = Some(s);
        }
        // Check if score beats the lowest entry
        count < cap || lowest.is_none_or(|l| score > l)
    }

    /// Get the rank a score would achieve within its difficulty
    /// (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, difficulty: Difficulty, score: u64) -> Option<usize> {
        if !self.qualifies(difficulty, score) {
            return None;
        }
        Some(self.scores_for(difficulty).filter(|&s| s >= score).count() + 1)
    }

    /// Add a finished game to the leaderboard (if it qualifies)
    /// Returns the rank achieved within its difficulty or None if didn't qualify
    pub fn add(&mut self, record: &ScoreRecord) -> Option<usize> {
        let rank = self.potential_rank(record.difficulty, record.score)?;

        let pos = self
            .entries
            .iter()
            .position(|e| record.score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, HighScoreEntry::from(record));

        if let Some(cap) = self.per_difficulty_cap {
            let mut kept = 0;
            self.entries.retain(|e| {
                if e.difficulty != record.difficulty {
                    return true;
                }
                kept += 1;
                kept <= cap
            });
        }
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// The single best entry across all difficulties
    pub fn best(&self) -> Option<BestScore> {
        self.entries.first().map(|e| BestScore {
            score: e.score,
            wave: e.wave,
        })
    }

    /// Best entries across all difficulties, highest first
    pub fn top(&self, limit: usize) -> Vec<&HighScoreEntry> {
        self.entries.iter().take(limit).collect()
    }

    /// Best entries for one difficulty, highest first
    pub fn top_for(&self, difficulty: Difficulty, limit: usize) -> Vec<&HighScoreEntry> {
        self.entries
            .iter()
            .filter(|e| e.difficulty == difficulty)
            .take(limit)
            .collect()
    }

    /// Leaderboard query: one difficulty or all of them, highest first
    pub fn leaderboard(&self, difficulty: Option<Difficulty>, limit: usize) -> Vec<HighScoreEntry> {
        let entries = match difficulty {
            Some(d) => self.top_for(d, limit),
            None => self.top(limit),
        };
        entries.into_iter().cloned().collect()
    }

    /// Highest entry recorded under `player_name`
    pub fn best_for_player(&self, player_name: &str) -> Option<&HighScoreEntry> {
        self.entries.iter().find(|e| e.player_name == player_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(score: u64, difficulty: Difficulty) -> ScoreRecord {
        ScoreRecord {
            score,
            wave: 2,
            accuracy: 97.5,
            difficulty,
            player_name: None,
            timestamp: 0.0,
        }
    }

    #[test]
    fn test_sorted_insert_and_rank() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add(&record(100, Difficulty::Normal)), Some(1));
        assert_eq!(scores.add(&record(300, Difficulty::Normal)), Some(1));
        // Ranks count within the difficulty
        assert_eq!(scores.add(&record(200, Difficulty::Hard)), Some(1));
        let order: Vec<u64> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(order, vec![300, 200, 100]);
        assert_eq!(scores.top_score(), Some(300));
        assert_eq!(scores.entries[0].player_name, ANONYMOUS);
    }

    #[test]
    fn test_zero_never_qualifies() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add(&record(0, Difficulty::Easy)), None);
        assert!(scores.is_empty());
        assert!(scores.best().is_none());
    }

    #[test]
    fn test_capped_at_ten() {
        let mut scores = HighScores::new();
        for s in 1..=15 {
            scores.add(&record(s * 10, Difficulty::Normal));
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert!(!scores.qualifies(Difficulty::Normal, 50));
        assert_eq!(scores.potential_rank(Difficulty::Normal, 155), Some(1));
        assert_eq!(scores.potential_rank(Difficulty::Normal, 65), Some(10));
        // Other difficulties have their own board
        assert_eq!(scores.potential_rank(Difficulty::Easy, 5), Some(1));
    }

    #[test]
    fn test_cap_is_per_difficulty() {
        let mut scores = HighScores::new();
        scores.add(&record(5, Difficulty::Easy));
        for s in 100..110 {
            scores.add(&record(s, Difficulty::Hard));
        }
        assert_eq!(scores.add(&record(200, Difficulty::Hard)), Some(1));
        assert_eq!(scores.top_for(Difficulty::Hard, 20).len(), MAX_HIGH_SCORES);
        assert_eq!(scores.top_for(Difficulty::Hard, 20).last().unwrap().score, 101);
        let easy = scores.top_for(Difficulty::Easy, 10);
        assert_eq!(easy.len(), 1);
        assert_eq!(easy[0].score, 5);
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES + 1);
    }

    #[test]
    fn test_unbounded_keeps_everything() {
        let mut scores = HighScores::unbounded();
        for s in 1..=25 {
            scores.add(&record(s, Difficulty::Normal));
        }
        assert_eq!(scores.entries.len(), 25);
        assert_eq!(scores.potential_rank(Difficulty::Normal, 1), Some(26));
        let top: Vec<u64> = scores.top(3).iter().map(|e| e.score).collect();
        assert_eq!(top, vec![25, 24, 23]);
    }

    #[test]
    fn test_deserialized_board_is_unbounded() {
        let mut scores = HighScores::unbounded();
        for s in 1..=12 {
            scores.add(&record(s, Difficulty::Hard));
        }
        let json = serde_json::to_string(&scores).unwrap();
        let mut loaded: HighScores = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.entries.len(), 12);
        assert!(loaded.add(&record(1, Difficulty::Hard)).is_some());
        assert_eq!(loaded.entries.len(), 13);
    }

    #[test]
    fn test_best_for_player() {
        let mut scores = HighScores::new();
        let named = |score, name: Option<&str>| ScoreRecord {
            player_name: name.map(str::to_string),
            ..record(score, Difficulty::Normal)
        };
        scores.add(&named(40, Some("ada")));
        scores.add(&named(90, None));
        scores.add(&named(70, Some("ada")));
        assert_eq!(scores.best_for_player("ada").map(|e| e.score), Some(70));
        assert_eq!(scores.best_for_player(ANONYMOUS).map(|e| e.score), Some(90));
        assert!(scores.best_for_player("grace").is_none());
    }

    #[test]
    fn test_top_for_difficulty() {
        let mut scores = HighScores::new();
        scores.add(&record(10, Difficulty::Easy));
        scores.add(&record(50, Difficulty::Hard));
        scores.add(&record(30, Difficulty::Easy));
        let easy: Vec<u64> = scores
            .top_for(Difficulty::Easy, 5)
            .iter()
            .map(|e| e.score)
            .collect();
        assert_eq!(easy, vec![30, 10]);
        assert_eq!(scores.top_for(Difficulty::Easy, 1).len(), 1);
        assert_eq!(
            scores.best(),
            Some(BestScore {
                score: 50,
                wave: 2
            })
        );
    }
}
