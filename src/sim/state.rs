//! Game state and core simulation types
//!
//! `GameState` is one play session: the entity registry (missiles and
//! launchers), typing state, keystroke accounting, the wave clock and the
//! outgoing event/effect queues. Nothing here is global; every session is an
//! independent value.

use std::collections::BTreeSet;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::WaveClock;
use super::events::{GameEvent, ScheduledEffect};
use super::scoring::{self, FinalScore};
use crate::consts::*;
use crate::settings::{Difficulty, TypoPolicy};
use crate::tuning::Tuning;

pub type EntityId = u32;

/// Top-level phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No session in play
    Menu,
    /// Wave 1 title card
    Announcing,
    /// Active gameplay
    Running,
    /// Player pause (Escape)
    Paused,
    /// Pause-flagged wave waiting for any key
    WaitingToStart,
    /// Between-wave rest period
    WaveTransition,
    /// All launchers lost
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissileKind {
    /// Falls toward a launcher
    Normal,
    /// Flies sideways carrying a challenge; never hits anything
    Special,
}

/// A missile entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Missile {
    pub id: EntityId,
    /// What is drawn on screen
    pub display: String,
    /// What must be typed
    pub answer: String,
    pub kind: MissileKind,
    pub pos: Vec2,
    /// Pixels per second
    pub vel: Vec2,
    /// Launcher this missile is diving at (Normal only)
    pub target_launcher: Option<EntityId>,
    pub spawned_at_ms: f64,
}

impl Missile {
    pub fn answer_len(&self) -> usize {
        crate::char_len(&self.answer)
    }

    /// Does the answer start with a non-empty `prefix`?
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        !prefix.is_empty() && self.answer.starts_with(prefix)
    }
}

/// A defended launcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Launcher {
    pub id: EntityId,
    pub pos: Vec2,
    pub hitpoints: u32,
    pub max_hitpoints: u32,
}

impl Launcher {
    pub fn is_alive(&self) -> bool {
        self.hitpoints > 0
    }

    pub fn is_damaged(&self) -> bool {
        self.hitpoints < self.max_hitpoints
    }

    /// Apply one hit. Returns true if this hit destroyed the launcher.
    pub fn take_hit(&mut self) -> bool {
        if self.hitpoints == 0 {
            return false;
        }
        self.hitpoints -= 1;
        self.hitpoints == 0
    }
}

/// What the player has typed and what it points at
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingState {
    pub prefix: String,
    /// Uncorrected wrong characters; always the last `error_count` chars of `prefix`
    pub error_count: u32,
    /// Every missile whose answer starts with the valid part of the prefix
    pub targeted: Vec<EntityId>,
    /// Set iff exactly one missile is targeted
    pub locked: Option<EntityId>,
}

impl TypingState {
    pub fn clear(&mut self) {
        self.prefix.clear();
        self.error_count = 0;
        self.targeted.clear();
        self.locked = None;
    }

    /// The prefix without its trailing wrong characters
    pub fn valid_prefix(&self) -> &str {
        let keep = crate::char_len(&self.prefix).saturating_sub(self.error_count as usize);
        match self.prefix.char_indices().nth(keep) {
            Some((byte, _)) => &self.prefix[..byte],
            None => &self.prefix,
        }
    }

    pub fn valid_len(&self) -> usize {
        crate::char_len(self.valid_prefix())
    }
}

/// Keystroke accounting for accuracy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystrokeStats {
    pub total: u32,
    pub correct: u32,
}

impl KeystrokeStats {
    pub fn accuracy(&self) -> f64 {
        scoring::accuracy(self.correct, self.total)
    }
}

/// One play session
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Session counter, used to discard late persistence results
    pub generation: u64,
    pub difficulty: Difficulty,
    pub typo_policy: TypoPolicy,
    pub phase: GamePhase,
    /// Wall-clock deadline for Announcing / WaveTransition
    pub phase_until_ms: f64,
    /// Current wave (1-based)
    pub wave: u32,
    pub max_wave_reached: u32,
    /// Running score before the accuracy multiplier
    pub score: u64,
    /// Set once, on game over
    pub final_score: Option<FinalScore>,
    /// Live missiles (sorted by id)
    pub missiles: Vec<Missile>,
    pub launchers: Vec<Launcher>,
    pub typing: TypingState,
    pub stats: KeystrokeStats,
    pub clock: WaveClock,
    /// Running time since the last spawn attempt
    pub spawn_timer_ms: f64,
    /// Timestamp of the previous tick; `None` right after a resume
    pub last_tick_ms: Option<f64>,
    /// Latest timestamp seen
    pub now_ms: f64,
    /// Notifications for presentation/audio, drained by the host
    pub events: Vec<GameEvent>,
    /// Deferred visual effects, drained by the host
    pub effects: Vec<ScheduledEffect>,
    pub rng: Pcg32,
    next_id: EntityId,
}

impl GameState {
    /// Create a session in the wave 1 announcement
    pub fn new(
        seed: u64,
        generation: u64,
        difficulty: Difficulty,
        typo_policy: TypoPolicy,
        tuning: &Tuning,
        now_ms: f64,
    ) -> Self {
        let mut state = Self {
            seed,
            generation,
            difficulty,
            typo_policy,
            phase: GamePhase::Announcing,
            phase_until_ms: now_ms + tuning.timing.announcement_ms,
            wave: 1,
            max_wave_reached: 1,
            score: 0,
            final_score: None,
            missiles: Vec::new(),
            launchers: Vec::new(),
            typing: TypingState::default(),
            stats: KeystrokeStats::default(),
            clock: WaveClock::new(tuning.timing.wave_duration_ms, tuning.timing.bonus_window_ms),
            spawn_timer_ms: 0.0,
            last_tick_ms: Some(now_ms),
            now_ms,
            events: Vec::new(),
            effects: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        };

        let launcher = tuning.launcher.playable();
        state.place_launchers(launcher.count, launcher.hitpoints);

        let name = tuning.wave_definition(difficulty, 1).name;
        state.events.push(GameEvent::GameStarted {
            generation,
            difficulty,
        });
        state.events.push(GameEvent::WaveAnnounced { wave: 1, name });
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spread launchers evenly along the bottom edge
    fn place_launchers(&mut self, count: u32, hitpoints: u32) {
        let y = ARENA_HEIGHT - LAUNCHER_BASELINE;
        for i in 0..count {
            let id = self.next_entity_id();
            let x = ARENA_WIDTH * (i + 1) as f32 / (count + 1) as f32;
            self.launchers.push(Launcher {
                id,
                pos: Vec2::new(x, y),
                hitpoints,
                max_hitpoints: hitpoints,
            });
        }
    }

    pub fn missile(&self, id: EntityId) -> Option<&Missile> {
        self.missiles.iter().find(|m| m.id == id)
    }

    pub fn launcher(&self, id: EntityId) -> Option<&Launcher> {
        self.launchers.iter().find(|l| l.id == id)
    }

    /// Remove a missile from the registry
    pub fn remove_missile(&mut self, id: EntityId) -> Option<Missile> {
        let index = self.missiles.iter().position(|m| m.id == id)?;
        Some(self.missiles.remove(index))
    }

    /// Register a freshly spawned missile, keeping id order
    pub fn insert_missile(&mut self, missile: Missile) {
        let index = self.missiles.partition_point(|m| m.id < missile.id);
        self.missiles.insert(index, missile);
    }

    /// Answers currently on screen
    pub fn active_answers(&self) -> BTreeSet<&str> {
        self.missiles.iter().map(|m| m.answer.as_str()).collect()
    }

    pub fn is_answer_active(&self, answer: &str) -> bool {
        self.missiles.iter().any(|m| m.answer == answer)
    }

    pub fn alive_launchers(&self) -> impl Iterator<Item = &Launcher> {
        self.launchers.iter().filter(|l| l.is_alive())
    }

    pub fn any_launcher_alive(&self) -> bool {
        self.launchers.iter().any(Launcher::is_alive)
    }

    pub fn accuracy(&self) -> f64 {
        self.stats.accuracy()
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Take all pending visual effects
    pub fn drain_effects(&mut self) -> Vec<ScheduledEffect> {
        std::mem::take(&mut self.effects)
    }
}
