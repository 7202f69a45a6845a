//! JSON file score store

use std::fs;
use std::path::{Path, PathBuf};

use super::{BestScore, PersistenceError, ScoreRecord, ScoreService};
use crate::highscores::{HighScoreEntry, HighScores};
use crate::settings::Difficulty;

/// Keeps every finished game in a single JSON document
#[derive(Debug, Clone)]
pub struct FileScoreService {
    path: PathBuf,
}

impl FileScoreService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full history; a missing file is an empty board
    pub fn load(&self) -> Result<HighScores, PersistenceError> {
        if !self.path.exists() {
            return Ok(HighScores::unbounded());
        }
        let json = fs::read_to_string(&self.path).map_err(|source| self.io_error(source))?;
        Ok(serde_json::from_str(&json)?)
    }

    fn store(&self, scores: &HighScores) -> Result<(), PersistenceError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| self.io_error(source))?;
        }
        let json = serde_json::to_string_pretty(scores)?;
        fs::write(&self.path, json).map_err(|source| self.io_error(source))
    }

    fn io_error(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ScoreService for FileScoreService {
    fn fetch_best(&mut self) -> Result<Option<BestScore>, PersistenceError> {
        Ok(self.load()?.best())
    }

    fn save(&mut self, record: &ScoreRecord) -> Result<Option<BestScore>, PersistenceError> {
        let mut scores = self.load()?;
        if let Some(rank) = scores.add(record) {
            self.store(&scores)?;
            log::info!("Saved score {} at rank {}", record.score, rank);
        }
        Ok(scores.best())
    }

    fn high_scores(
        &mut self,
        difficulty: Option<Difficulty>,
        limit: usize,
    ) -> Result<Vec<HighScoreEntry>, PersistenceError> {
        Ok(self.load()?.leaderboard(difficulty, limit))
    }

    fn player_best(&mut self, player_name: &str) -> Result<Option<HighScoreEntry>, PersistenceError> {
        Ok(self.load()?.best_for_player(player_name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(score: u64) -> ScoreRecord {
        ScoreRecord {
            score,
            wave: 4,
            accuracy: 100.0,
            difficulty: Difficulty::Hard,
            player_name: None,
            timestamp: 0.0,
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = FileScoreService::new(dir.path().join("scores.json"));
        assert_eq!(service.fetch_best().unwrap(), None);
    }

    #[test]
    fn test_save_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("scores.json");
        let mut service = FileScoreService::new(&path);
        service.save(&record(300)).unwrap();
        let best = service.save(&record(100)).unwrap();
        assert_eq!(
            best,
            Some(BestScore {
                score: 300,
                wave: 4
            })
        );

        let reopened = FileScoreService::new(&path);
        let scores = reopened.load().unwrap();
        assert_eq!(scores.entries.len(), 2);
        assert_eq!(scores.entries[1].player_name, "Anonymous");
    }

    #[test]
    fn test_history_survives_other_difficulties() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = FileScoreService::new(dir.path().join("scores.json"));
        service
            .save(&ScoreRecord {
                difficulty: Difficulty::Easy,
                player_name: Some("ada".into()),
                ..record(5)
            })
            .unwrap();
        for score in 100..112 {
            service.save(&record(score)).unwrap();
        }

        let easy = service.high_scores(Some(Difficulty::Easy), 10).unwrap();
        assert_eq!(easy.len(), 1);
        assert_eq!(easy[0].score, 5);

        let hard = service.high_scores(Some(Difficulty::Hard), 10).unwrap();
        assert_eq!(hard.len(), 10);
        assert_eq!(hard[0].score, 111);
        assert_eq!(service.high_scores(None, 100).unwrap().len(), 13);

        let ada = service.player_best("ada").unwrap().unwrap();
        assert_eq!(ada.score, 5);
        assert_eq!(ada.difficulty, Difficulty::Easy);
        assert_eq!(service.player_best("Anonymous").unwrap().map(|e| e.score), Some(111));
        assert!(service.player_best("grace").unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        fs::write(&path, "{ not json").unwrap();
        let mut service = FileScoreService::new(&path);
        assert!(matches!(
            service.fetch_best(),
            Err(PersistenceError::Parse(_))
        ));
    }
}
