//! Events and deferred effects emitted by the simulation
//!
//! Authoritative state changes happen before anything is pushed here; these
//! queues only tell presentation and audio what already happened.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::scoring::FinalScore;
use super::state::{EntityId, MissileKind};
use crate::settings::Difficulty;

/// Notifications for the UI and sound system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    GameStarted {
        generation: u64,
        difficulty: Difficulty,
    },
    /// Title card for an upcoming wave
    WaveAnnounced { wave: u32, name: String },
    /// Pause-flagged wave is waiting for a key press
    WaitingForKey { wave: u32 },
    WaveStarted { wave: u32 },
    /// Wave timer ran out; remaining missiles were cleared without points
    WaveCleared { wave: u32, missiles_cleared: usize },
    BonusStarted { wave: u32 },
    BonusEnded { wave: u32 },
    MissileSpawned { id: EntityId, kind: MissileKind },
    MissileDestroyed {
        id: EntityId,
        kind: MissileKind,
        points: u64,
        bonus: bool,
    },
    /// Special entity flew off screen
    SpecialEscaped { id: EntityId },
    LauncherHit {
        launcher_id: EntityId,
        missile_id: EntityId,
        hitpoints: u32,
    },
    LauncherDestroyed { launcher_id: EntityId },
    TargetLocked { id: EntityId },
    /// Everything the player was typing at disappeared
    TargetLost,
    Typo { ch: char },
    /// Strict mode error cap reached; the character was ignored
    InputRejected,
    Paused,
    Resumed,
    GameOver { result: FinalScore },
    /// Score service failed; using the local leaderboard from now on
    ScoresLocalOnly,
    BestScoreUpdated { score: u64, wave: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Missile typed out
    Explosion,
    /// Missile swept away at wave end
    Fizzle,
}

/// A visual effect for the host to play at `fire_at_ms`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEffect {
    pub missile_id: EntityId,
    pub kind: EffectKind,
    pub pos: Vec2,
    pub fire_at_ms: f64,
}
