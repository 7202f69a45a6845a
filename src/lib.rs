//! QWERTY Command - a typing arcade game
//!
//! Missiles carrying words fall toward the player's launchers; typing a
//! missile's answer destroys it.
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, targeting, waves, scoring)
//! - `game`: Top-level controller owning the live session
//! - `tuning`: Data-driven game balance
//! - `words`: Word lists per category
//! - `persistence`: Best-score fetch/save with local-only fallback
//! - `audio`: Sound cues triggered by game events

pub mod audio;
pub mod game;
pub mod highscores;
pub mod persistence;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod words;

pub use game::Game;
pub use highscores::HighScores;
pub use settings::Settings;
pub use tuning::Tuning;
pub use words::WordBank;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Playfield dimensions (pixels)
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;

    /// Normal missiles appear just above the top edge
    pub const SPAWN_Y: f32 = -20.0;
    /// Horizontal margin kept free when picking a spawn x
    pub const SPAWN_MARGIN: f32 = 40.0;
    /// How far outside the arena a special entity starts / counts as escaped
    pub const OFFSCREEN_MARGIN: f32 = 60.0;

    /// Launchers sit this far above the bottom edge
    pub const LAUNCHER_BASELINE: f32 = 40.0;
    /// Distance at which a missile counts as arrived at its launcher
    pub const LAUNCHER_HIT_RADIUS: f32 = 18.0;

    /// Largest physics step applied per tick (ms); longer gaps are clamped
    pub const MAX_PHYSICS_DT_MS: f64 = 100.0;

    /// Attempts made to draw an answer not already on screen
    pub const UNIQUE_ANSWER_ATTEMPTS: u32 = 20;

    /// Word used when every configured category is empty
    pub const PLACEHOLDER_WORD: &str = "missile";
}

/// Unit vector from `from` toward `to` scaled to `speed`
#[inline]
pub fn velocity_toward(from: Vec2, to: Vec2, speed: f32) -> Vec2 {
    (to - from).normalize_or_zero() * speed
}

/// Number of characters (not bytes) in a string
#[inline]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}
