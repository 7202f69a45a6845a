//! Points and the end-of-game accuracy multiplier

use serde::{Deserialize, Serialize};

use super::state::MissileKind;
use crate::tuning::{AccuracyTier, ScoringTuning};

/// Points for destroying a missile with an answer of `answer_len` characters
pub fn destruction_points(
    answer_len: usize,
    kind: MissileKind,
    bonus_active: bool,
    tuning: &ScoringTuning,
) -> u64 {
    let mut points = tuning.base_points + answer_len as u64 * tuning.length_bonus;
    if kind == MissileKind::Special {
        points += tuning.special_bonus;
    }
    if bonus_active {
        points *= 2;
    }
    points
}

/// Percentage of keystrokes that were correct. Zero keystrokes is a perfect 100.
pub fn accuracy(correct: u32, total: u32) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (f64::from(correct) / f64::from(total) * 100.0).clamp(0.0, 100.0)
}

/// First tier (top-down) whose threshold is reached, else 1x
pub fn accuracy_multiplier(accuracy: f64, table: &[AccuracyTier]) -> f64 {
    table
        .iter()
        .find(|tier| accuracy >= tier.min_accuracy)
        .map(|tier| tier.multiplier)
        .unwrap_or(1.0)
}

pub fn apply_multiplier(running_score: u64, multiplier: f64) -> u64 {
    (running_score as f64 * multiplier).round() as u64
}

/// Result of a finished session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinalScore {
    pub running_score: u64,
    pub accuracy: f64,
    pub multiplier: f64,
    pub score: u64,
    pub wave: u32,
}

pub fn finalize(
    running_score: u64,
    correct: u32,
    total: u32,
    wave: u32,
    tuning: &ScoringTuning,
) -> FinalScore {
    let accuracy = accuracy(correct, total);
    let multiplier = accuracy_multiplier(accuracy, &tuning.accuracy_multipliers);
    FinalScore {
        running_score,
        accuracy,
        multiplier,
        score: apply_multiplier(running_score, multiplier),
        wave,
    }
}
