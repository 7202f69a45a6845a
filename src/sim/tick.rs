//! Per-tick simulation and key dispatch
//!
//! One call to [`tick`] per host frame advances the wave clock, the spawner
//! and missile movement, in that order. Keys arrive between ticks through
//! [`handle_key`]. The session phase decides which of these run.

use super::clock::ClockEdge;
use super::events::{EffectKind, GameEvent, ScheduledEffect};
use super::scoring;
use super::spawn::{SpawnContext, spawn_missile};
use super::state::{EntityId, GamePhase, GameState, MissileKind};
use super::targeting;
use crate::consts::*;
use crate::tuning::Tuning;
use crate::words::WordSource;

/// Discrete keyboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Backspace,
    Enter,
    Escape,
}

/// Advance the session to `now_ms` (host wall clock)
pub fn tick(state: &mut GameState, tuning: &Tuning, words: &dyn WordSource, now_ms: f64) {
    let dt_ms = match state.last_tick_ms {
        Some(last) => (now_ms - last).max(0.0),
        None => 0.0,
    };
    state.last_tick_ms = Some(now_ms);
    state.now_ms = now_ms;

    match state.phase {
        GamePhase::Menu
        | GamePhase::Paused
        | GamePhase::WaitingToStart
        | GamePhase::GameOver => return,
        GamePhase::Announcing | GamePhase::WaveTransition => {
            if now_ms >= state.phase_until_ms {
                begin_wave(state, tuning);
            }
            return;
        }
        GamePhase::Running => {}
    }

    if advance_clock(state, dt_ms) {
        end_wave(state, tuning);
        return;
    }
    run_spawner(state, tuning, words, dt_ms);
    step_physics(state, tuning, dt_ms.min(MAX_PHYSICS_DT_MS));
}

/// Route a key according to the current phase
pub fn handle_key(state: &mut GameState, tuning: &Tuning, key: KeyInput) {
    match (state.phase, key) {
        (GamePhase::Running, KeyInput::Escape) => {
            state.phase = GamePhase::Paused;
            state.events.push(GameEvent::Paused);
            log::info!("Paused with {:.0} ms left", state.clock.remaining_ms());
        }
        (GamePhase::Paused, KeyInput::Escape) => {
            state.phase = GamePhase::Running;
            // Time spent paused never reaches the clock
            state.last_tick_ms = None;
            state.events.push(GameEvent::Resumed);
        }
        (GamePhase::WaitingToStart, KeyInput::Escape) => {}
        (GamePhase::WaitingToStart, _) => {
            start_running(state, tuning);
            state.last_tick_ms = None;
        }
        (GamePhase::Running, KeyInput::Char(ch)) if !ch.is_control() => {
            targeting::type_char(state, ch, tuning);
        }
        (GamePhase::Running, KeyInput::Backspace) => targeting::backspace(state),
        (GamePhase::Running, KeyInput::Enter) => targeting::enter(state),
        _ => {}
    }
}

/// Announcement or transition finished
fn begin_wave(state: &mut GameState, tuning: &Tuning) {
    let def = tuning.wave_definition(state.difficulty, state.wave);
    if def.pause_before_start {
        state.phase = GamePhase::WaitingToStart;
        state.events.push(GameEvent::WaitingForKey { wave: state.wave });
        log::info!("Wave {} waiting for player", state.wave);
    } else {
        start_running(state, tuning);
    }
}

fn start_running(state: &mut GameState, tuning: &Tuning) {
    state.phase = GamePhase::Running;
    state.clock.reset();
    // First missile of the wave launches on the first running tick
    state.spawn_timer_ms = tuning
        .spawning
        .get(state.difficulty)
        .interval_for_wave(state.wave);
    state.events.push(GameEvent::WaveStarted { wave: state.wave });
    log::info!("Wave {} started", state.wave);
}

/// Returns true once the wave has run out
fn advance_clock(state: &mut GameState, dt_ms: f64) -> bool {
    let wave = state.wave;
    let mut expired = false;
    for edge in state.clock.advance(dt_ms) {
        match edge {
            ClockEdge::BonusStarted => state.events.push(GameEvent::BonusStarted { wave }),
            ClockEdge::BonusEnded => state.events.push(GameEvent::BonusEnded { wave }),
            ClockEdge::Expired => expired = true,
        }
    }
    expired
}

/// Wave timer expired: sweep the sky without awarding points and move on
fn end_wave(state: &mut GameState, tuning: &Tuning) {
    let cleared = std::mem::take(&mut state.missiles);
    for missile in &cleared {
        state.effects.push(ScheduledEffect {
            missile_id: missile.id,
            kind: EffectKind::Fizzle,
            pos: missile.pos,
            fire_at_ms: state.now_ms,
        });
    }
    state.typing.clear();
    state.events.push(GameEvent::WaveCleared {
        wave: state.wave,
        missiles_cleared: cleared.len(),
    });
    log::info!("Wave {} over, score {}", state.wave, state.score);

    state.wave += 1;
    state.max_wave_reached = state.max_wave_reached.max(state.wave);
    state.phase = GamePhase::WaveTransition;
    state.phase_until_ms = state.now_ms + tuning.timing.wave_transition_ms;

    let name = tuning.wave_definition(state.difficulty, state.wave).name;
    state.events.push(GameEvent::WaveAnnounced {
        wave: state.wave,
        name,
    });
}

fn run_spawner(state: &mut GameState, tuning: &Tuning, words: &dyn WordSource, dt_ms: f64) {
    state.spawn_timer_ms += dt_ms;
    let interval = tuning
        .spawning
        .get(state.difficulty)
        .interval_for_wave(state.wave);
    if state.spawn_timer_ms < interval {
        return;
    }
    state.spawn_timer_ms = 0.0;

    let wave_def = tuning.wave_definition(state.difficulty, state.wave);
    let ctx = SpawnContext {
        tuning,
        words,
        difficulty: state.difficulty,
        wave: state.wave,
        wave_def: &wave_def,
    };
    let id = state.next_entity_id();
    let spawned = spawn_missile(
        &mut state.rng,
        &ctx,
        &state.missiles,
        &state.launchers,
        id,
        state.now_ms,
    );

    match spawned {
        Some(missile) => {
            log::debug!("Spawned {:?} '{}' (#{})", missile.kind, missile.answer, id);
            state.events.push(GameEvent::MissileSpawned {
                id,
                kind: missile.kind,
            });
            state.insert_missile(missile);
            if !state.typing.prefix.is_empty() {
                targeting::retarget(state);
            }
        }
        None => log::debug!("No live launcher to aim at, spawn skipped"),
    }
}

/// Move missiles and resolve arrivals and escapes
fn step_physics(state: &mut GameState, tuning: &Tuning, dt_ms: f64) {
    let dt = (dt_ms / 1000.0) as f32;
    for missile in &mut state.missiles {
        missile.pos += missile.vel * dt;
    }

    let mut arrivals: Vec<(EntityId, EntityId)> = Vec::new();
    let mut escaped: Vec<EntityId> = Vec::new();
    for missile in &state.missiles {
        match missile.kind {
            MissileKind::Normal => {
                let target = missile.target_launcher.and_then(|id| state.launcher(id));
                match target {
                    Some(launcher) => {
                        if missile.pos.distance(launcher.pos) <= LAUNCHER_HIT_RADIUS
                            || missile.pos.y >= launcher.pos.y
                        {
                            arrivals.push((missile.id, launcher.id));
                        }
                    }
                    None => {
                        if missile.pos.y > ARENA_HEIGHT + OFFSCREEN_MARGIN {
                            escaped.push(missile.id);
                        }
                    }
                }
            }
            MissileKind::Special => {
                if missile.pos.x < -OFFSCREEN_MARGIN || missile.pos.x > ARENA_WIDTH + OFFSCREEN_MARGIN {
                    escaped.push(missile.id);
                }
            }
        }
    }

    if arrivals.is_empty() && escaped.is_empty() {
        return;
    }

    for &(missile_id, launcher_id) in &arrivals {
        state.remove_missile(missile_id);
        hit_launcher(state, launcher_id, missile_id);
    }
    for &id in &escaped {
        state.remove_missile(id);
        state.events.push(GameEvent::SpecialEscaped { id });
    }

    if !state.typing.prefix.is_empty() {
        targeting::retarget(state);
    }

    if !arrivals.is_empty() && !state.any_launcher_alive() {
        game_over(state, tuning);
    }
}

fn hit_launcher(state: &mut GameState, launcher_id: EntityId, missile_id: EntityId) {
    let Some(launcher) = state.launchers.iter_mut().find(|l| l.id == launcher_id) else {
        return;
    };
    if !launcher.is_alive() {
        return;
    }
    let destroyed = launcher.take_hit();
    let hitpoints = launcher.hitpoints;
    state.events.push(GameEvent::LauncherHit {
        launcher_id,
        missile_id,
        hitpoints,
    });
    if destroyed {
        log::info!("Launcher {} destroyed", launcher_id);
        state.events.push(GameEvent::LauncherDestroyed { launcher_id });
    }
}

/// Last launcher fell. Runs at most once per session.
fn game_over(state: &mut GameState, tuning: &Tuning) {
    if state.phase == GamePhase::GameOver {
        return;
    }
    state.phase = GamePhase::GameOver;
    state.typing.clear();

    let result = scoring::finalize(
        state.score,
        state.stats.correct,
        state.stats.total,
        state.wave,
        &tuning.scoring,
    );
    log::info!(
        "Game over on wave {}: {} x{} = {} ({:.1}% accuracy)",
        result.wave,
        result.running_score,
        result.multiplier,
        result.score,
        result.accuracy
    );
    state.final_score = Some(result);
    state.events.push(GameEvent::GameOver { result });
}
