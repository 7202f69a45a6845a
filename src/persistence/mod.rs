//! Score persistence
//!
//! The engine never talks to storage directly. It queues
//! [`PersistenceRequest`]s tagged with the session generation; the host runs
//! them against a [`ScoreService`] whenever convenient and hands the results
//! back through [`ScoreSync::complete`]. Results from an older session are
//! dropped, and any failure demotes the session to the in-memory leaderboard.

pub mod file;

pub use file::FileScoreService;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::highscores::{HighScoreEntry, HighScores};
use crate::settings::Difficulty;
use crate::sim::GameEvent;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("score store {path} unavailable: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt score store: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("score service unavailable: {0}")]
    Unavailable(String),
}

/// Best result on record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestScore {
    pub score: u64,
    pub wave: u32,
}

/// One finished game, as submitted to the score service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub score: u64,
    pub wave: u32,
    pub accuracy: f64,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub player_name: Option<String>,
    /// Unix timestamp (ms)
    pub timestamp: f64,
}

/// Storage backend for scores
pub trait ScoreService {
    fn fetch_best(&mut self) -> Result<Option<BestScore>, PersistenceError>;

    /// Store a record and return the best score after the save
    fn save(&mut self, record: &ScoreRecord) -> Result<Option<BestScore>, PersistenceError>;

    /// Highest scores, optionally for one difficulty only
    fn high_scores(
        &mut self,
        difficulty: Option<Difficulty>,
        limit: usize,
    ) -> Result<Vec<HighScoreEntry>, PersistenceError>;

    fn player_best(&mut self, player_name: &str) -> Result<Option<HighScoreEntry>, PersistenceError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestKind {
    FetchBest,
    Save(ScoreRecord),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersistenceRequest {
    pub generation: u64,
    pub kind: RequestKind,
}

#[derive(Debug)]
pub struct PersistenceResponse {
    pub generation: u64,
    pub result: Result<Option<BestScore>, PersistenceError>,
}

/// Run one request to completion against a service
pub fn execute(service: &mut dyn ScoreService, request: PersistenceRequest) -> PersistenceResponse {
    let result = match &request.kind {
        RequestKind::FetchBest => service.fetch_best(),
        RequestKind::Save(record) => service.save(record),
    };
    PersistenceResponse {
        generation: request.generation,
        result,
    }
}

/// Session-side bookkeeping for asynchronous score calls
#[derive(Debug, Default)]
pub struct ScoreSync {
    generation: u64,
    local_only: bool,
    best: Option<BestScore>,
    local: HighScores,
    pending: Vec<PersistenceRequest>,
    events: Vec<GameEvent>,
}

impl ScoreSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_local_only(&self) -> bool {
        self.local_only
    }

    pub fn best(&self) -> Option<BestScore> {
        self.best
    }

    pub fn local_scores(&self) -> &HighScores {
        &self.local
    }

    /// A new session starts: older in-flight results become stale and the
    /// service gets another chance. Queued saves still go out.
    pub fn begin_session(&mut self, generation: u64) {
        self.generation = generation;
        self.local_only = false;
        self.pending.push(PersistenceRequest {
            generation,
            kind: RequestKind::FetchBest,
        });
    }

    /// Submit a finished game. The local leaderboard always records it.
    pub fn request_save(&mut self, record: ScoreRecord) {
        if let Some(rank) = self.local.add(&record) {
            log::info!("Local high score #{} ({})", rank, record.score);
        }
        if self.local_only {
            let best = self.local.best();
            self.update_best(best);
            return;
        }
        self.pending.push(PersistenceRequest {
            generation: self.generation,
            kind: RequestKind::Save(record),
        });
    }

    pub fn take_requests(&mut self) -> Vec<PersistenceRequest> {
        std::mem::take(&mut self.pending)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Merge a finished request
    pub fn complete(&mut self, response: PersistenceResponse) {
        if response.generation != self.generation {
            log::debug!(
                "Dropping score result for generation {} (current {})",
                response.generation,
                self.generation
            );
            return;
        }
        match response.result {
            Ok(best) => self.update_best(best),
            Err(e) => {
                if !self.local_only {
                    log::warn!("Score service failed, keeping scores locally: {}", e);
                    self.local_only = true;
                    self.events.push(GameEvent::ScoresLocalOnly);
                }
                let best = self.local.best();
                self.update_best(best);
            }
        }
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn update_best(&mut self, candidate: Option<BestScore>) {
        let Some(candidate) = candidate else {
            return;
        };
        let improved = self.best.is_none_or(|b| candidate.score > b.score);
        if improved {
            self.best = Some(candidate);
            self.events.push(GameEvent::BestScoreUpdated {
                score: candidate.score,
                wave: candidate.wave,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Service that fails every call
    struct Offline;

    impl ScoreService for Offline {
        fn fetch_best(&mut self) -> Result<Option<BestScore>, PersistenceError> {
            Err(PersistenceError::Unavailable("offline".into()))
        }

        fn save(&mut self, _record: &ScoreRecord) -> Result<Option<BestScore>, PersistenceError> {
            Err(PersistenceError::Unavailable("offline".into()))
        }

        fn high_scores(
            &mut self,
            _difficulty: Option<Difficulty>,
            _limit: usize,
        ) -> Result<Vec<HighScoreEntry>, PersistenceError> {
            Err(PersistenceError::Unavailable("offline".into()))
        }

        fn player_best(&mut self, _player_name: &str) -> Result<Option<HighScoreEntry>, PersistenceError> {
            Err(PersistenceError::Unavailable("offline".into()))
        }
    }

    /// In-memory service
    #[derive(Default)]
    struct Memory {
        scores: HighScores,
    }

    impl ScoreService for Memory {
        fn fetch_best(&mut self) -> Result<Option<BestScore>, PersistenceError> {
            Ok(self.scores.best())
        }

        fn save(&mut self, record: &ScoreRecord) -> Result<Option<BestScore>, PersistenceError> {
            self.scores.add(record);
            Ok(self.scores.best())
        }

        fn high_scores(
            &mut self,
            difficulty: Option<Difficulty>,
            limit: usize,
        ) -> Result<Vec<HighScoreEntry>, PersistenceError> {
            Ok(self.scores.leaderboard(difficulty, limit))
        }

        fn player_best(&mut self, player_name: &str) -> Result<Option<HighScoreEntry>, PersistenceError> {
            Ok(self.scores.best_for_player(player_name).cloned())
        }
    }

    fn record(score: u64) -> ScoreRecord {
        ScoreRecord {
            score,
            wave: 3,
            accuracy: 98.0,
            difficulty: Difficulty::Normal,
            player_name: Some("ada".into()),
            timestamp: 1.0,
        }
    }

    fn run_all(sync: &mut ScoreSync, service: &mut dyn ScoreService) {
        for request in sync.take_requests() {
            let response = execute(service, request);
            sync.complete(response);
        }
    }

    #[test]
    fn test_session_fetches_best() {
        let mut service = Memory::default();
        service.scores.add(&record(700));
        let mut sync = ScoreSync::new();
        sync.begin_session(1);
        assert!(sync.has_pending());
        run_all(&mut sync, &mut service);
        assert_eq!(
            sync.best(),
            Some(BestScore {
                score: 700,
                wave: 3
            })
        );
        assert_eq!(
            sync.drain_events(),
            vec![GameEvent::BestScoreUpdated {
                score: 700,
                wave: 3
            }]
        );
    }

    #[test]
    fn test_save_reports_new_best() {
        let mut service = Memory::default();
        let mut sync = ScoreSync::new();
        sync.begin_session(1);
        run_all(&mut sync, &mut service);
        assert!(sync.best().is_none());

        sync.request_save(record(120));
        run_all(&mut sync, &mut service);
        assert_eq!(sync.best().map(|b| b.score), Some(120));
        assert_eq!(service.scores.top_score(), Some(120));
        assert_eq!(sync.local_scores().top_score(), Some(120));
    }

    #[test]
    fn test_stale_generation_dropped() {
        let mut sync = ScoreSync::new();
        sync.begin_session(1);
        let stale = sync.take_requests();
        sync.begin_session(2);
        for request in stale {
            sync.complete(PersistenceResponse {
                generation: request.generation,
                result: Ok(Some(BestScore {
                    score: 9999,
                    wave: 9,
                })),
            });
        }
        assert!(sync.best().is_none());
        assert!(sync.drain_events().is_empty());
    }

    #[test]
    fn test_failure_demotes_to_local_only() {
        let mut sync = ScoreSync::new();
        sync.begin_session(1);
        run_all(&mut sync, &mut Offline);
        assert!(sync.is_local_only());
        assert_eq!(sync.drain_events(), vec![GameEvent::ScoresLocalOnly]);

        // Saves no longer reach the service
        sync.request_save(record(250));
        assert!(!sync.has_pending());
        assert_eq!(sync.best().map(|b| b.score), Some(250));
        assert_eq!(
            sync.drain_events(),
            vec![GameEvent::BestScoreUpdated {
                score: 250,
                wave: 3
            }]
        );

        // Next session retries the service
        sync.begin_session(2);
        assert!(!sync.is_local_only());
        assert!(sync.has_pending());
    }

    #[test]
    fn test_lower_score_keeps_best() {
        let mut service = Memory::default();
        let mut sync = ScoreSync::new();
        sync.begin_session(1);
        sync.request_save(record(500));
        run_all(&mut sync, &mut service);
        sync.drain_events();

        sync.request_save(record(100));
        run_all(&mut sync, &mut service);
        assert_eq!(sync.best().map(|b| b.score), Some(500));
        assert!(sync.drain_events().is_empty());
    }
}
