//! Per-wave countdown
//!
//! The clock only moves when the session feeds it elapsed wall-clock time
//! while running, so a paused game resumes with exactly the time it had left
//! and the tick rate never stretches a wave.

use serde::{Deserialize, Serialize};

/// Transitions reported by [`WaveClock::advance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEdge {
    BonusStarted,
    BonusEnded,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveClock {
    duration_ms: f64,
    bonus_window_ms: f64,
    elapsed_ms: f64,
    bonus_active: bool,
    expired: bool,
}

impl WaveClock {
    pub fn new(duration_ms: f64, bonus_window_ms: f64) -> Self {
        Self {
            duration_ms: duration_ms.max(0.0),
            bonus_window_ms: bonus_window_ms.max(0.0),
            elapsed_ms: 0.0,
            bonus_active: false,
            expired: false,
        }
    }

    /// Restart the countdown for a new wave
    pub fn reset(&mut self) {
        self.elapsed_ms = 0.0;
        self.bonus_active = false;
        self.expired = false;
    }

    /// Is `elapsed_ms` inside the trailing bonus window?
    pub fn bonus_window_contains(&self, elapsed_ms: f64) -> bool {
        self.bonus_window_ms > 0.0
            && elapsed_ms >= self.duration_ms - self.bonus_window_ms
            && elapsed_ms < self.duration_ms
    }

    /// Move the clock forward; each edge is reported once per transition
    pub fn advance(&mut self, dt_ms: f64) -> Vec<ClockEdge> {
        let mut edges = Vec::new();
        if self.expired {
            return edges;
        }

        self.elapsed_ms += dt_ms.max(0.0);

        if self.elapsed_ms >= self.duration_ms {
            self.elapsed_ms = self.duration_ms;
            if self.bonus_active {
                self.bonus_active = false;
                edges.push(ClockEdge::BonusEnded);
            }
            self.expired = true;
            edges.push(ClockEdge::Expired);
            return edges;
        }

        let bonus = self.bonus_window_contains(self.elapsed_ms);
        if bonus != self.bonus_active {
            self.bonus_active = bonus;
            edges.push(if bonus {
                ClockEdge::BonusStarted
            } else {
                ClockEdge::BonusEnded
            });
        }
        edges
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn remaining_ms(&self) -> f64 {
        (self.duration_ms - self.elapsed_ms).max(0.0)
    }

    pub fn is_bonus_active(&self) -> bool {
        self.bonus_active
    }
}
