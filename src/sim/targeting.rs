//! Typed-prefix targeting
//!
//! [`resolve`] is a pure function of the prefix and the live missiles. The
//! keystroke handlers below apply its result to a session: accounting,
//! locking, typo policy and completion. A completed missile is removed and
//! scored before any event or effect is queued, so the next keystroke can
//! never see it.

use super::events::{EffectKind, GameEvent, ScheduledEffect};
use super::scoring;
use super::state::{EntityId, GameState, Missile};
use crate::settings::TypoPolicy;
use crate::tuning::Tuning;

/// What a prefix points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing typed
    Idle,
    /// Non-empty prefix that matches no missile
    Typo,
    /// Exactly one match
    Locked(EntityId),
    /// Two or more matches, none locked
    Targeted(Vec<EntityId>),
}

impl Resolution {
    pub fn targeted(&self) -> Vec<EntityId> {
        match self {
            Resolution::Locked(id) => vec![*id],
            Resolution::Targeted(ids) => ids.clone(),
            Resolution::Idle | Resolution::Typo => Vec::new(),
        }
    }

    pub fn locked(&self) -> Option<EntityId> {
        match self {
            Resolution::Locked(id) => Some(*id),
            _ => None,
        }
    }
}

/// Ids of every missile whose answer starts with a non-empty `prefix`
pub fn matches(prefix: &str, missiles: &[Missile]) -> Vec<EntityId> {
    missiles
        .iter()
        .filter(|m| m.matches_prefix(prefix))
        .map(|m| m.id)
        .collect()
}

pub fn resolve(prefix: &str, missiles: &[Missile]) -> Resolution {
    if prefix.is_empty() {
        return Resolution::Idle;
    }
    let mut ids = matches(prefix, missiles);
    match ids.len() {
        0 => Resolution::Typo,
        1 => Resolution::Locked(ids.remove(0)),
        _ => Resolution::Targeted(ids),
    }
}

/// The missile fully typed by `prefix`: a single match whose answer is the
/// whole prefix. Two live copies of the same answer both match, so neither
/// completes until one of them is gone.
pub fn completed(prefix: &str, missiles: &[Missile]) -> Option<EntityId> {
    let id = resolve(prefix, missiles).locked()?;
    missiles
        .iter()
        .find(|m| m.id == id && m.answer == prefix)
        .map(|m| m.id)
}

/// Recompute targeting for the current valid prefix. When the prefix no
/// longer matches anything (its missiles are gone) the typing state is
/// cleared. Returns false in that case.
pub fn retarget(state: &mut GameState) -> bool {
    let resolution = resolve(state.typing.valid_prefix(), &state.missiles);
    if resolution == Resolution::Typo {
        state.typing.clear();
        state.events.push(GameEvent::TargetLost);
        return false;
    }
    set_targets(state, &resolution);
    true
}

fn set_targets(state: &mut GameState, resolution: &Resolution) {
    let locked = resolution.locked();
    if let Some(id) = locked
        && state.typing.locked != Some(id)
    {
        state.events.push(GameEvent::TargetLocked { id });
    }
    state.typing.targeted = resolution.targeted();
    state.typing.locked = locked;
}

/// A printable key while running
pub fn type_char(state: &mut GameState, ch: char, tuning: &Tuning) {
    let strict = state.typo_policy == TypoPolicy::Strict;
    // Only keys that would add another error are refused at the cap
    let capped = strict && state.typing.error_count >= tuning.input.max_errors;

    // Anything typed after an uncorrected error is another error
    if strict && state.typing.error_count > 0 {
        if capped {
            state.events.push(GameEvent::InputRejected);
            return;
        }
        state.stats.total += 1;
        record_strict_error(state, ch);
        return;
    }

    let mut candidate = state.typing.prefix.clone();
    candidate.push(ch);

    match resolve(&candidate, &state.missiles) {
        Resolution::Typo | Resolution::Idle => {
            if capped {
                state.events.push(GameEvent::InputRejected);
                return;
            }
            state.stats.total += 1;
            state.events.push(GameEvent::Typo { ch });
            match state.typo_policy {
                TypoPolicy::Strict => record_strict_error(state, ch),
                TypoPolicy::Forgiving => drop_until_match(state),
            }
        }
        resolution => {
            state.stats.total += 1;
            state.stats.correct += 1;
            state.typing.prefix = candidate;
            set_targets(state, &resolution);
            if let Some(id) = completed(&state.typing.prefix, &state.missiles) {
                complete(state, id, tuning);
            }
        }
    }
}

fn record_strict_error(state: &mut GameState, ch: char) {
    if state.typing.error_count > 0 {
        state.events.push(GameEvent::Typo { ch });
    }
    state.typing.prefix.push(ch);
    state.typing.error_count += 1;
}

/// Forgiving typo: the typed character was never kept; shorten the prefix
/// until it matches again or is empty
fn drop_until_match(state: &mut GameState) {
    while !state.typing.prefix.is_empty()
        && resolve(&state.typing.prefix, &state.missiles) == Resolution::Typo
    {
        state.typing.prefix.pop();
    }
    if state.typing.prefix.is_empty() {
        state.typing.clear();
    } else {
        let resolution = resolve(&state.typing.prefix, &state.missiles);
        set_targets(state, &resolution);
    }
}

/// Destroy a fully typed missile and score it
fn complete(state: &mut GameState, id: EntityId, tuning: &Tuning) {
    state.typing.clear();
    let Some(missile) = state.remove_missile(id) else {
        return;
    };

    let bonus = state.clock.is_bonus_active();
    let points =
        scoring::destruction_points(missile.answer_len(), missile.kind, bonus, &tuning.scoring);
    state.score += points;

    log::debug!("Destroyed '{}' for {} points", missile.answer, points);
    state.events.push(GameEvent::MissileDestroyed {
        id,
        kind: missile.kind,
        points,
        bonus,
    });
    state.effects.push(ScheduledEffect {
        missile_id: id,
        kind: EffectKind::Explosion,
        pos: missile.pos,
        fire_at_ms: state.now_ms + tuning.timing.explosion_ms,
    });
}

/// Remove the last typed character. A wrong character only clears an error;
/// a correct one is taken back out of the accuracy figures entirely.
pub fn backspace(state: &mut GameState) {
    if state.typing.prefix.pop().is_none() {
        return;
    }
    if state.typing.error_count > 0 {
        state.typing.error_count -= 1;
    } else {
        state.stats.total = state.stats.total.saturating_sub(1);
        state.stats.correct = state.stats.correct.saturating_sub(1);
    }

    if state.typing.prefix.is_empty() {
        state.typing.clear();
    } else {
        retarget(state);
    }
}

/// Drop everything typed so far
pub fn enter(state: &mut GameState) {
    state.typing.clear();
}
