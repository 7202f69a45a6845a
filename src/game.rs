//! Session owner
//!
//! Wraps one [`GameState`] at a time together with the configuration it runs
//! on and the score bookkeeping that outlives individual sessions. Hosts talk
//! to this type: feed it ticks and keys, drain events and effects, and run
//! its persistence requests whenever they like.

use crate::persistence::{
    self, BestScore, PersistenceRequest, PersistenceResponse, ScoreRecord, ScoreService, ScoreSync,
};
use crate::settings::Settings;
use crate::sim::{self, GameEvent, GamePhase, GameState, KeyInput, ScheduledEffect, Snapshot};
use crate::tuning::Tuning;
use crate::words::WordBank;

pub struct Game {
    pub tuning: Tuning,
    pub words: WordBank,
    pub settings: Settings,
    session: Option<GameState>,
    scores: ScoreSync,
    generation: u64,
    /// Final score of the current session was handed to the score sync
    submitted: bool,
    /// Finished session left behind the menu; still readable
    in_menu: bool,
}

impl Game {
    pub fn new(tuning: Tuning, words: WordBank, settings: Settings) -> Self {
        Self {
            tuning,
            words,
            settings,
            session: None,
            scores: ScoreSync::new(),
            generation: 0,
            submitted: false,
            in_menu: false,
        }
    }

    /// Menu when no session is in play
    pub fn phase(&self) -> GamePhase {
        match &self.session {
            Some(state) if !self.in_menu => state.phase,
            _ => GamePhase::Menu,
        }
    }

    pub fn session(&self) -> Option<&GameState> {
        self.session.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn best(&self) -> Option<BestScore> {
        self.scores.best()
    }

    pub fn scores(&self) -> &ScoreSync {
        &self.scores
    }

    /// Start a new session from the menu or after game over.
    /// Returns false while a session is still in play.
    pub fn start_game(&mut self, seed: u64, now_ms: f64) -> bool {
        if !matches!(self.phase(), GamePhase::Menu | GamePhase::GameOver) {
            return false;
        }
        self.generation += 1;
        self.submitted = false;
        self.in_menu = false;
        self.scores.begin_session(self.generation);
        self.session = Some(GameState::new(
            seed,
            self.generation,
            self.settings.difficulty,
            self.settings.typo_policy,
            &self.tuning,
            now_ms,
        ));
        log::info!(
            "Game {} started ({}, seed {})",
            self.generation,
            self.settings.difficulty.as_str(),
            seed
        );
        true
    }

    /// Leave a finished session. Its state stays readable until the next
    /// `start_game`.
    pub fn return_to_menu(&mut self) -> bool {
        if self.phase() != GamePhase::GameOver {
            return false;
        }
        self.in_menu = true;
        true
    }

    /// Advance the running session to `now_ms` (Unix ms)
    pub fn tick(&mut self, now_ms: f64) {
        let Some(state) = self.session.as_mut() else {
            return;
        };
        sim::tick(state, &self.tuning, &self.words, now_ms);

        if !self.submitted
            && let Some(result) = state.final_score
        {
            self.submitted = true;
            let record = ScoreRecord {
                score: result.score,
                wave: result.wave,
                accuracy: result.accuracy,
                difficulty: state.difficulty,
                player_name: self.settings.player_name.clone(),
                timestamp: state.now_ms,
            };
            self.scores.request_save(record);
        }
    }

    pub fn handle_key(&mut self, key: KeyInput) {
        if let Some(state) = self.session.as_mut() {
            sim::handle_key(state, &self.tuning, key);
        }
    }

    /// Session events followed by score events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        let mut events = self
            .session
            .as_mut()
            .map(|s| s.drain_events())
            .unwrap_or_default();
        events.extend(self.scores.drain_events());
        events
    }

    pub fn drain_effects(&mut self) -> Vec<ScheduledEffect> {
        self.session
            .as_mut()
            .map(|s| s.drain_effects())
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        let mut snapshot = sim::snapshot::build(self.session.as_ref()?);
        snapshot.best = self.scores.best().map(|b| b.score);
        Some(snapshot)
    }

    pub fn take_persistence_requests(&mut self) -> Vec<PersistenceRequest> {
        self.scores.take_requests()
    }

    pub fn complete_persistence(&mut self, response: PersistenceResponse) {
        self.scores.complete(response);
    }

    /// Run every queued request against `service` right away
    pub fn service_pending(&mut self, service: &mut dyn ScoreService) {
        for request in self.scores.take_requests() {
            let response = persistence::execute(service, request);
            self.scores.complete(response);
        }
    }
}
