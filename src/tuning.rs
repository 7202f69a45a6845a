//! Data-driven game balance
//!
//! Every section is optional in the JSON source; anything missing falls back
//! to the built-in values below, so `Tuning::default()` is a complete,
//! playable configuration.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::Difficulty;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One value per difficulty level. A difficulty left out of the JSON keeps
/// its built-in value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    default,
    bound(deserialize = "T: Deserialize<'de>, PerDifficulty<T>: Default")
)]
pub struct PerDifficulty<T> {
    pub easy: T,
    pub normal: T,
    pub hard: T,
}

impl<T> PerDifficulty<T> {
    pub fn get(&self, difficulty: Difficulty) -> &T {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Normal => &self.normal,
            Difficulty::Hard => &self.hard,
        }
    }
}

/// Durations, all in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub wave_duration_ms: f64,
    pub announcement_ms: f64,
    pub wave_transition_ms: f64,
    /// Trailing part of each wave where points are doubled
    pub bonus_window_ms: f64,
    /// How long after a kill the explosion effect fires
    pub explosion_ms: f64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            wave_duration_ms: 45_000.0,
            announcement_ms: 2_500.0,
            wave_transition_ms: 3_000.0,
            bonus_window_ms: 10_000.0,
            explosion_ms: 400.0,
        }
    }
}

/// Missile speeds, pixels per second
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Speeds {
    pub base: f32,
    pub per_wave_increase: f32,
    /// Subtracted per answer character so long words fall slower
    pub length_penalty: f32,
    /// Random factor is drawn from `[1 - variability, 1 + variability]`
    pub variability: f32,
    pub minimum: f32,
}

impl Default for Speeds {
    fn default() -> Self {
        Self {
            base: 40.0,
            per_wave_increase: 4.0,
            length_penalty: 1.5,
            variability: 0.2,
            minimum: 15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTiming {
    pub base_interval_ms: f64,
    pub min_interval_ms: f64,
    pub decrease_per_wave_ms: f64,
}

impl SpawnTiming {
    /// Spawn interval for a 1-based wave number
    pub fn interval_for_wave(&self, wave: u32) -> f64 {
        let shrink = f64::from(wave.saturating_sub(1)) * self.decrease_per_wave_ms;
        (self.base_interval_ms - shrink).max(self.min_interval_ms)
    }
}

/// Normal difficulty pacing
impl Default for SpawnTiming {
    fn default() -> Self {
        PerDifficulty::<SpawnTiming>::default().normal
    }
}

impl Default for PerDifficulty<SpawnTiming> {
    fn default() -> Self {
        default_spawning()
    }
}

fn default_spawning() -> PerDifficulty<SpawnTiming> {
    PerDifficulty {
        easy: SpawnTiming {
            base_interval_ms: 3_000.0,
            min_interval_ms: 1_400.0,
            decrease_per_wave_ms: 150.0,
        },
        normal: SpawnTiming {
            base_interval_ms: 2_400.0,
            min_interval_ms: 900.0,
            decrease_per_wave_ms: 150.0,
        },
        hard: SpawnTiming {
            base_interval_ms: 1_800.0,
            min_interval_ms: 600.0,
            decrease_per_wave_ms: 120.0,
        },
    }
}

/// Special ("ufo") entity settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UfoSettings {
    /// Probability per spawn once the minimum wave is reached
    pub chance: f64,
    pub min_wave: PerDifficulty<u32>,
    pub speed_multiplier: f32,
    /// Vertical band the lateral flight path is drawn from
    pub band_top: f32,
    pub band_bottom: f32,
}

/// Minimum wave for special entities
impl Default for PerDifficulty<u32> {
    fn default() -> Self {
        Self {
            easy: 3,
            normal: 2,
            hard: 1,
        }
    }
}

impl Default for UfoSettings {
    fn default() -> Self {
        Self {
            chance: 0.1,
            min_wave: PerDifficulty::default(),
            speed_multiplier: 0.7,
            band_top: 60.0,
            band_bottom: 200.0,
        }
    }
}

/// One row of the accuracy multiplier table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccuracyTier {
    /// Minimum accuracy percentage (inclusive)
    pub min_accuracy: f64,
    pub multiplier: f64,
}

impl Default for AccuracyTier {
    fn default() -> Self {
        Self {
            min_accuracy: 0.0,
            multiplier: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTuning {
    pub base_points: u64,
    pub length_bonus: u64,
    pub special_bonus: u64,
    /// Evaluated top-down; the first tier reached wins, otherwise 1x
    pub accuracy_multipliers: Vec<AccuracyTier>,
}

impl Default for ScoringTuning {
    fn default() -> Self {
        Self {
            base_points: 10,
            length_bonus: 5,
            special_bonus: 50,
            accuracy_multipliers: vec![
                AccuracyTier {
                    min_accuracy: 100.0,
                    multiplier: 10.0,
                },
                AccuracyTier {
                    min_accuracy: 99.0,
                    multiplier: 5.0,
                },
                AccuracyTier {
                    min_accuracy: 98.0,
                    multiplier: 3.0,
                },
                AccuracyTier {
                    min_accuracy: 97.0,
                    multiplier: 2.0,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherTuning {
    pub count: u32,
    pub hitpoints: u32,
}

impl LauncherTuning {
    /// A session needs at least one launcher that can take a hit, otherwise
    /// it could never end
    pub fn playable(&self) -> Self {
        Self {
            count: self.count.max(1),
            hitpoints: self.hitpoints.max(1),
        }
    }
}

impl Default for LauncherTuning {
    fn default() -> Self {
        Self {
            count: 3,
            hitpoints: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputTuning {
    /// Wrong characters allowed in strict mode before input is refused
    pub max_errors: u32,
}

impl Default for InputTuning {
    fn default() -> Self {
        Self { max_errors: 3 }
    }
}

fn default_speed_multiplier() -> f32 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveDefinition {
    pub name: String,
    /// Word categories drawn from during this wave
    pub categories: Vec<String>,
    #[serde(default = "default_speed_multiplier")]
    pub speed_multiplier: f32,
    /// Hold the wave until the player presses a key
    #[serde(default)]
    pub pause_before_start: bool,
}

impl WaveDefinition {
    fn new(name: &str, categories: &[&str], speed_multiplier: f32, pause_before_start: bool) -> Self {
        Self {
            name: name.to_string(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            speed_multiplier,
            pause_before_start,
        }
    }
}

fn default_wave_list(scale: f32) -> Vec<WaveDefinition> {
    vec![
        WaveDefinition::new("Warm Up", &["short"], 1.0 * scale, false),
        WaveDefinition::new("Picking Up", &["short", "medium"], 1.05 * scale, false),
        WaveDefinition::new("Midfield", &["medium"], 1.1 * scale, false),
        WaveDefinition::new("Long Haul", &["medium", "long"], 1.1 * scale, true),
        WaveDefinition::new("Code Red", &["code", "medium"], 1.15 * scale, false),
        WaveDefinition::new("Onslaught", &["long", "code"], 1.25 * scale, true),
    ]
}

impl Default for PerDifficulty<Vec<WaveDefinition>> {
    fn default() -> Self {
        Self {
            easy: default_wave_list(0.8),
            normal: default_wave_list(1.0),
            hard: default_wave_list(1.25),
        }
    }
}

/// Kinds of special-entity challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    Arithmetic,
    Phrase,
    MixedCase,
    Symbols,
    Reversed,
}

/// A display/answer pair shown on a special entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeEntry {
    pub display: String,
    pub answer: String,
}

fn entry(display: &str, answer: &str) -> ChallengeEntry {
    ChallengeEntry {
        display: display.to_string(),
        answer: answer.to_string(),
    }
}

fn default_challenges() -> BTreeMap<ChallengeKind, Vec<ChallengeEntry>> {
    let mut table = BTreeMap::new();
    table.insert(
        ChallengeKind::Arithmetic,
        vec![
            entry("7 x 8", "56"),
            entry("12 + 29", "41"),
            entry("100 - 37", "63"),
            entry("81 / 9", "9"),
            entry("15 x 4", "60"),
        ],
    );
    table.insert(
        ChallengeKind::Phrase,
        vec![
            entry("hello world", "hello world"),
            entry("all systems go", "all systems go"),
            entry("type faster", "type faster"),
        ],
    );
    table.insert(
        ChallengeKind::MixedCase,
        vec![
            entry("JavaScript", "JavaScript"),
            entry("GitHub", "GitHub"),
            entry("iPhone", "iPhone"),
            entry("McDonald", "McDonald"),
        ],
    );
    table.insert(
        ChallengeKind::Symbols,
        vec![
            entry("a@b.com", "a@b.com"),
            entry("x += 1;", "x += 1;"),
            entry("#!/bin/sh", "#!/bin/sh"),
            entry("{ok: true}", "{ok: true}"),
        ],
    );
    table.insert(
        ChallengeKind::Reversed,
        vec![
            entry("tekcor", "rocket"),
            entry("dlrow", "world"),
            entry("draobyek", "keyboard"),
            entry("elissim", "missile"),
        ],
    );
    table
}

/// Fully resolved game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub timing: Timing,
    pub speeds: Speeds,
    pub spawning: PerDifficulty<SpawnTiming>,
    pub ufo: UfoSettings,
    pub scoring: ScoringTuning,
    pub launcher: LauncherTuning,
    pub input: InputTuning,
    pub waves: PerDifficulty<Vec<WaveDefinition>>,
    pub challenges: BTreeMap<ChallengeKind, Vec<ChallengeEntry>>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            timing: Timing::default(),
            speeds: Speeds::default(),
            spawning: PerDifficulty::default(),
            ufo: UfoSettings::default(),
            scoring: ScoringTuning::default(),
            launcher: LauncherTuning::default(),
            input: InputTuning::default(),
            waves: PerDifficulty::default(),
            challenges: default_challenges(),
        }
    }
}

impl Tuning {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut tuning: Self = serde_json::from_str(json)?;
        tuning.launcher = tuning.launcher.playable();
        Ok(tuning)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Load tuning from disk; any failure falls back to the built-in balance
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(e) => {
                log::warn!("Using built-in tuning: {}", e);
                Self::default()
            }
        }
    }

    /// Wave definition for a 1-based wave number; waves past the end of the
    /// list repeat the last one
    pub fn wave_definition(&self, difficulty: Difficulty, wave: u32) -> WaveDefinition {
        let list = self.waves.get(difficulty);
        let index = wave.saturating_sub(1) as usize;
        list.get(index)
            .or_else(|| list.last())
            .cloned()
            .unwrap_or_else(|| {
                WaveDefinition::new("Endless", &["short", "medium", "long"], 1.0, false)
            })
    }
}
