//! Read-only view of a session for renderers

use serde::{Deserialize, Serialize};

use super::scoring::FinalScore;
use super::state::{EntityId, GamePhase, GameState, MissileKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissileView {
    pub id: EntityId,
    pub display: String,
    pub answer_len: usize,
    pub x: f32,
    pub y: f32,
    pub kind: MissileKind,
    /// Characters of the answer already typed
    pub typed_chars: usize,
    pub targeted: bool,
    pub locked: bool,
    /// Targeted while uncorrected wrong characters are pending
    pub error: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LauncherView {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub hitpoints: u32,
    pub max_hitpoints: u32,
    pub damaged: bool,
    pub destroyed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub wave: u32,
    pub score: u64,
    pub final_score: Option<FinalScore>,
    /// Best score on record; filled in by the session owner
    pub best: Option<u64>,
    pub typed: String,
    pub error_count: u32,
    pub accuracy: f64,
    pub bonus_active: bool,
    pub remaining_ms: f64,
    pub missiles: Vec<MissileView>,
    pub launchers: Vec<LauncherView>,
}

pub fn build(state: &GameState) -> Snapshot {
    let typing = &state.typing;
    let typed_chars = typing.valid_len();

    let missiles = state
        .missiles
        .iter()
        .map(|m| {
            let targeted = typing.targeted.contains(&m.id);
            MissileView {
                id: m.id,
                display: m.display.clone(),
                answer_len: m.answer_len(),
                x: m.pos.x,
                y: m.pos.y,
                kind: m.kind,
                typed_chars: if targeted { typed_chars } else { 0 },
                targeted,
                locked: typing.locked == Some(m.id),
                error: targeted && typing.error_count > 0,
            }
        })
        .collect();

    let launchers = state
        .launchers
        .iter()
        .map(|l| LauncherView {
            id: l.id,
            x: l.pos.x,
            y: l.pos.y,
            hitpoints: l.hitpoints,
            max_hitpoints: l.max_hitpoints,
            damaged: l.is_damaged(),
            destroyed: !l.is_alive(),
        })
        .collect();

    Snapshot {
        phase: state.phase,
        wave: state.wave,
        score: state.score,
        final_score: state.final_score,
        best: None,
        typed: typing.prefix.clone(),
        error_count: typing.error_count,
        accuracy: state.accuracy(),
        bonus_active: state.clock.is_bonus_active(),
        remaining_ms: state.clock.remaining_ms(),
        missiles,
        launchers,
    }
}
