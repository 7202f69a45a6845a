//! Sound cue mapping
//!
//! Synthesis belongs to the host. This module decides which game event
//! triggers which sound and at what volume.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::sim::{GameEvent, MissileKind};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Missile left a launcher's silo
    Launch,
    /// Missile destroyed by typing
    Explosion,
    /// Special entity shot down
    SpecialDestroyed,
    /// Wrong character typed
    Typo,
    /// Strict mode error cap reached
    Rejected,
    /// Prefix narrowed down to a single missile
    Lock,
    /// Launcher took a hit
    LauncherHit,
    /// Launcher destroyed
    LauncherDestroyed,
    /// Bonus window opened
    BonusStart,
    WaveStart,
    /// Wave timer expired
    WaveClear,
    GameOver,
    /// New best score
    HighScore,
}

/// Which sound, if any, an event plays
pub fn cue_for(event: &GameEvent) -> Option<SoundEffect> {
    let effect = match event {
        GameEvent::MissileSpawned { .. } => SoundEffect::Launch,
        GameEvent::MissileDestroyed { kind, .. } => match kind {
            MissileKind::Normal => SoundEffect::Explosion,
            MissileKind::Special => SoundEffect::SpecialDestroyed,
        },
        GameEvent::Typo { .. } => SoundEffect::Typo,
        GameEvent::InputRejected => SoundEffect::Rejected,
        GameEvent::TargetLocked { .. } => SoundEffect::Lock,
        GameEvent::LauncherHit { .. } => SoundEffect::LauncherHit,
        GameEvent::LauncherDestroyed { .. } => SoundEffect::LauncherDestroyed,
        GameEvent::BonusStarted { .. } => SoundEffect::BonusStart,
        GameEvent::WaveStarted { .. } => SoundEffect::WaveStart,
        GameEvent::WaveCleared { .. } => SoundEffect::WaveClear,
        GameEvent::GameOver { .. } => SoundEffect::GameOver,
        GameEvent::BestScoreUpdated { .. } => SoundEffect::HighScore,
        _ => return None,
    };
    Some(effect)
}

/// A sound the host should play now
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoundCue {
    pub effect: SoundEffect,
    /// 0.0 - 1.0
    pub volume: f32,
}

/// Turns event batches into sound cues using the player's audio settings
#[derive(Debug, Clone)]
pub struct AudioCues {
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioCues {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl AudioCues {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            master_volume: settings.master_volume.clamp(0.0, 1.0),
            sfx_volume: settings.sfx_volume.clamp(0.0, 1.0),
            muted: !settings.sound_enabled,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Volume cues play at, 0 when muted
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Cues for a batch of events, in event order. Nothing plays when muted.
    pub fn cues(&self, events: &[GameEvent]) -> Vec<SoundCue> {
        let volume = self.effective_volume();
        if volume <= 0.0 {
            return Vec::new();
        }
        events
            .iter()
            .filter_map(cue_for)
            .map(|effect| SoundCue { effect, volume })
            .collect()
    }
}
