//! Spawn scheduling: what to launch next and how fast
//!
//! All draws go through the caller's RNG so a seeded session replays exactly.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::Rng;

use super::state::{EntityId, Launcher, Missile, MissileKind};
use crate::consts::*;
use crate::settings::Difficulty;
use crate::tuning::{ChallengeEntry, ChallengeKind, Speeds, Tuning, WaveDefinition};
use crate::velocity_toward;
use crate::words::WordSource;

/// Everything the scheduler reads about the current wave
pub struct SpawnContext<'a> {
    pub tuning: &'a Tuning,
    pub words: &'a dyn WordSource,
    pub difficulty: Difficulty,
    /// 1-based wave number
    pub wave: u32,
    pub wave_def: &'a WaveDefinition,
}

/// Uniform pick from a slice
pub fn pick<'a, T, R: Rng>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.random_range(0..items.len()))
}

/// Redraw while the result is already on screen, up to
/// [`UNIQUE_ANSWER_ATTEMPTS`] draws; the last draw is kept even if taken
fn draw_unique<T, R, D, K>(rng: &mut R, mut draw: D, is_taken: K) -> Option<T>
where
    R: Rng,
    D: FnMut(&mut R) -> Option<T>,
    K: Fn(&T) -> bool,
{
    let mut last = None;
    for _ in 0..UNIQUE_ANSWER_ATTEMPTS {
        let candidate = draw(rng)?;
        if !is_taken(&candidate) {
            return Some(candidate);
        }
        last = Some(candidate);
    }
    last
}

/// Draw a word from the wave's categories: uniform over non-empty
/// categories, then uniform within the category
pub fn draw_word<R: Rng>(
    rng: &mut R,
    words: &dyn WordSource,
    categories: &[String],
    is_taken: impl Fn(&str) -> bool,
) -> String {
    let lists: Vec<&[String]> = categories
        .iter()
        .map(|c| words.words(c))
        .filter(|list| !list.is_empty())
        .collect();
    if lists.is_empty() {
        log::warn!("No words available for {:?}, using placeholder", categories);
        return PLACEHOLDER_WORD.to_string();
    }

    draw_unique(
        rng,
        |rng| {
            let list = *pick(rng, &lists)?;
            pick(rng, list).cloned()
        },
        |word: &String| is_taken(word.as_str()),
    )
    .unwrap_or_else(|| PLACEHOLDER_WORD.to_string())
}

/// Draw a challenge: uniform over kinds that have entries, then over entries
pub fn draw_challenge<R: Rng>(
    rng: &mut R,
    table: &BTreeMap<ChallengeKind, Vec<ChallengeEntry>>,
    is_taken: impl Fn(&str) -> bool,
) -> Option<ChallengeEntry> {
    let kinds: Vec<&Vec<ChallengeEntry>> = table.values().filter(|e| !e.is_empty()).collect();
    if kinds.is_empty() {
        return None;
    }
    draw_unique(
        rng,
        |rng| {
            let entries = *pick(rng, &kinds)?;
            pick(rng, entries).cloned()
        },
        |c: &ChallengeEntry| is_taken(c.answer.as_str()),
    )
}

/// Should this spawn be a special entity?
pub fn roll_special<R: Rng>(rng: &mut R, tuning: &Tuning, difficulty: Difficulty, wave: u32) -> bool {
    if wave < *tuning.ufo.min_wave.get(difficulty) {
        return false;
    }
    let chance = tuning.ufo.chance.clamp(0.0, 1.0);
    rng.random_bool(chance)
}

/// `base * waveMultiplier + (wave-1) * perWave - len * penalty`, jittered by
/// the variability band and floored at the minimum
pub fn compute_speed<R: Rng>(
    rng: &mut R,
    speeds: &Speeds,
    wave_def: &WaveDefinition,
    wave: u32,
    answer_len: usize,
) -> f32 {
    let nominal = speeds.base * wave_def.speed_multiplier
        + wave.saturating_sub(1) as f32 * speeds.per_wave_increase
        - answer_len as f32 * speeds.length_penalty;
    let band = speeds.variability.abs();
    let factor = if band > 0.0 {
        rng.random_range((1.0 - band)..=(1.0 + band))
    } else {
        1.0
    };
    (nominal * factor).max(speeds.minimum)
}

/// Build the next missile, or `None` when a normal missile has no live
/// launcher to aim at
pub fn spawn_missile<R: Rng>(
    rng: &mut R,
    ctx: &SpawnContext<'_>,
    live: &[Missile],
    launchers: &[Launcher],
    id: EntityId,
    now_ms: f64,
) -> Option<Missile> {
    let is_taken = |answer: &str| live.iter().any(|m| m.answer == answer);

    if roll_special(rng, ctx.tuning, ctx.difficulty, ctx.wave) {
        let challenge = draw_challenge(rng, &ctx.tuning.challenges, is_taken).unwrap_or_else(|| {
            let word = draw_word(rng, ctx.words, &ctx.wave_def.categories, is_taken);
            ChallengeEntry {
                display: word.clone(),
                answer: word,
            }
        });
        return Some(spawn_special(rng, ctx, challenge, id, now_ms));
    }

    let alive: Vec<&Launcher> = launchers.iter().filter(|l| l.is_alive()).collect();
    let target = *pick(rng, &alive)?;

    let answer = draw_word(rng, ctx.words, &ctx.wave_def.categories, is_taken);
    let speed = compute_speed(
        rng,
        &ctx.tuning.speeds,
        ctx.wave_def,
        ctx.wave,
        crate::char_len(&answer),
    );
    let x = rng.random_range(SPAWN_MARGIN..=(ARENA_WIDTH - SPAWN_MARGIN));
    let pos = Vec2::new(x, SPAWN_Y);

    Some(Missile {
        id,
        display: answer.clone(),
        answer,
        kind: MissileKind::Normal,
        pos,
        vel: velocity_toward(pos, target.pos, speed),
        target_launcher: Some(target.id),
        spawned_at_ms: now_ms,
    })
}

/// Sideways flight across the top band, direction picked at random
fn spawn_special<R: Rng>(
    rng: &mut R,
    ctx: &SpawnContext<'_>,
    challenge: ChallengeEntry,
    id: EntityId,
    now_ms: f64,
) -> Missile {
    let ufo = &ctx.tuning.ufo;
    let speed = compute_speed(
        rng,
        &ctx.tuning.speeds,
        ctx.wave_def,
        ctx.wave,
        crate::char_len(&challenge.answer),
    ) * ufo.speed_multiplier;

    let (top, bottom) = if ufo.band_top <= ufo.band_bottom {
        (ufo.band_top, ufo.band_bottom)
    } else {
        (ufo.band_bottom, ufo.band_top)
    };
    let y = rng.random_range(top..=bottom);
    let left_to_right = rng.random_bool(0.5);
    let (x, dir) = if left_to_right {
        (-SPAWN_MARGIN, 1.0)
    } else {
        (ARENA_WIDTH + SPAWN_MARGIN, -1.0)
    };

    Missile {
        id,
        display: challenge.display,
        answer: challenge.answer,
        kind: MissileKind::Special,
        pos: Vec2::new(x, y),
        vel: Vec2::new(dir * speed, 0.0),
        target_launcher: None,
        spawned_at_ms: now_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::words::WordBank;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn launcher(id: EntityId, x: f32, hitpoints: u32) -> Launcher {
        Launcher {
            id,
            pos: Vec2::new(x, ARENA_HEIGHT - LAUNCHER_BASELINE),
            hitpoints,
            max_hitpoints: 3,
        }
    }

    fn no_ufo() -> Tuning {
        let mut tuning = Tuning::default();
        tuning.ufo.chance = 0.0;
        tuning
    }

    fn missile(answer: &str) -> Missile {
        Missile {
            id: 99,
            display: answer.to_string(),
            answer: answer.to_string(),
            kind: MissileKind::Normal,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            target_launcher: None,
            spawned_at_ms: 0.0,
        }
    }

    #[test]
    fn test_speed_formula_without_jitter() {
        let mut rng = Pcg32::seed_from_u64(1);
        let speeds = Speeds {
            base: 40.0,
            per_wave_increase: 4.0,
            length_penalty: 1.5,
            variability: 0.0,
            minimum: 15.0,
        };
        let def = WaveDefinition {
            name: "w".into(),
            categories: vec![],
            speed_multiplier: 1.5,
            pause_before_start: false,
        };
        // 40 * 1.5 + 2 * 4 - 4 * 1.5 = 62
        let speed = compute_speed(&mut rng, &speeds, &def, 3, 4);
        assert!((speed - 62.0).abs() < 1e-4);

        // Very long answers hit the floor
        let speed = compute_speed(&mut rng, &speeds, &def, 1, 100);
        assert_eq!(speed, 15.0);
    }

    #[test]
    fn test_speed_jitter_stays_in_band() {
        let mut rng = Pcg32::seed_from_u64(2);
        let speeds = Speeds {
            minimum: 0.0,
            ..Speeds::default()
        };
        let def = Tuning::default().wave_definition(Difficulty::Normal, 1);
        for _ in 0..200 {
            let s = compute_speed(&mut rng, &speeds, &def, 1, 0);
            assert!((32.0 - 1e-3..=48.0 + 1e-3).contains(&s), "{s}");
        }
    }

    #[test]
    fn test_normal_missile_aims_at_live_launcher() {
        let tuning = no_ufo();
        let words = WordBank::builtin();
        let def = tuning.wave_definition(Difficulty::Normal, 1);
        let ctx = SpawnContext {
            tuning: &tuning,
            words: &words,
            difficulty: Difficulty::Normal,
            wave: 1,
            wave_def: &def,
        };
        let launchers = vec![launcher(1, 200.0, 0), launcher(2, 400.0, 2), launcher(3, 600.0, 0)];
        let mut rng = Pcg32::seed_from_u64(3);
        for id in 10..40 {
            let m = spawn_missile(&mut rng, &ctx, &[], &launchers, id, 0.0).unwrap();
            assert_eq!(m.kind, MissileKind::Normal);
            assert_eq!(m.target_launcher, Some(2));
            assert_eq!(m.display, m.answer);
            // Heading toward the launcher
            let to_target = launchers[1].pos - m.pos;
            assert!(m.vel.normalize().dot(to_target.normalize()) > 0.999);
        }
    }

    #[test]
    fn test_no_live_launcher_skips_normal_spawn() {
        let tuning = no_ufo();
        let words = WordBank::builtin();
        let def = tuning.wave_definition(Difficulty::Normal, 1);
        let ctx = SpawnContext {
            tuning: &tuning,
            words: &words,
            difficulty: Difficulty::Normal,
            wave: 1,
            wave_def: &def,
        };
        let launchers = vec![launcher(1, 200.0, 0)];
        let mut rng = Pcg32::seed_from_u64(4);
        assert!(spawn_missile(&mut rng, &ctx, &[], &launchers, 5, 0.0).is_none());
    }

    #[test]
    fn test_special_flies_sideways() {
        let mut tuning = Tuning::default();
        tuning.ufo.chance = 1.0;
        tuning.ufo.min_wave.normal = 1;
        let words = WordBank::builtin();
        let def = tuning.wave_definition(Difficulty::Normal, 1);
        let ctx = SpawnContext {
            tuning: &tuning,
            words: &words,
            difficulty: Difficulty::Normal,
            wave: 1,
            wave_def: &def,
        };
        let mut rng = Pcg32::seed_from_u64(5);
        let mut saw_left = false;
        let mut saw_right = false;
        for id in 0..40 {
            // Specials do not need a launcher
            let m = spawn_missile(&mut rng, &ctx, &[], &[], id, 0.0).unwrap();
            assert_eq!(m.kind, MissileKind::Special);
            assert!(m.target_launcher.is_none());
            assert_eq!(m.vel.y, 0.0);
            assert!((tuning.ufo.band_top..=tuning.ufo.band_bottom).contains(&m.pos.y));
            if m.vel.x > 0.0 {
                saw_right = true;
                assert!(m.pos.x < 0.0);
            } else {
                saw_left = true;
                assert!(m.pos.x > ARENA_WIDTH);
            }
        }
        assert!(saw_left && saw_right);
    }

    #[test]
    fn test_special_gated_by_min_wave() {
        let mut tuning = Tuning::default();
        tuning.ufo.chance = 1.0;
        let mut rng = Pcg32::seed_from_u64(6);
        // Easy needs wave 3
        assert!(!roll_special(&mut rng, &tuning, Difficulty::Easy, 2));
        assert!(roll_special(&mut rng, &tuning, Difficulty::Easy, 3));
    }

    #[test]
    fn test_word_draw_avoids_active_answers() {
        let mut bank = WordBank::new();
        bank.insert("pair", vec!["cat".into(), "car".into()]);
        let mut rng = Pcg32::seed_from_u64(7);
        let live = [missile("cat")];
        for _ in 0..50 {
            let w = draw_word(&mut rng, &bank, &["pair".to_string()], |a| {
                live.iter().any(|m| m.answer == a)
            });
            assert_eq!(w, "car");
        }
    }

    #[test]
    fn test_word_draw_accepts_duplicate_as_last_resort() {
        let mut bank = WordBank::new();
        bank.insert("solo", vec!["cat".into()]);
        let mut rng = Pcg32::seed_from_u64(8);
        let w = draw_word(&mut rng, &bank, &["solo".to_string()], |a| a == "cat");
        assert_eq!(w, "cat");
    }

    #[test]
    fn test_empty_categories_fall_back_to_placeholder() {
        let bank = WordBank::new();
        let mut rng = Pcg32::seed_from_u64(9);
        let w = draw_word(&mut rng, &bank, &["missing".to_string()], |_| false);
        assert_eq!(w, PLACEHOLDER_WORD);
        let w = draw_word(&mut rng, &bank, &[], |_| false);
        assert_eq!(w, PLACEHOLDER_WORD);
    }

    #[test]
    fn test_challenge_draw_skips_empty_kinds() {
        let mut table = BTreeMap::new();
        table.insert(ChallengeKind::Phrase, vec![]);
        table.insert(
            ChallengeKind::Arithmetic,
            vec![ChallengeEntry {
                display: "2 + 3".into(),
                answer: "5".into(),
            }],
        );
        let mut rng = Pcg32::seed_from_u64(10);
        let c = draw_challenge(&mut rng, &table, |_| false).unwrap();
        assert_eq!(c.display, "2 + 3");
        assert_eq!(c.answer, "5");

        assert!(draw_challenge(&mut rng, &BTreeMap::new(), |_| false).is_none());
    }

    #[test]
    fn test_special_without_challenges_uses_word() {
        let mut tuning = Tuning::default();
        tuning.ufo.chance = 1.0;
        tuning.ufo.min_wave.normal = 1;
        tuning.challenges.clear();
        let words = WordBank::builtin();
        let def = tuning.wave_definition(Difficulty::Normal, 1);
        let ctx = SpawnContext {
            tuning: &tuning,
            words: &words,
            difficulty: Difficulty::Normal,
            wave: 1,
            wave_def: &def,
        };
        let mut rng = Pcg32::seed_from_u64(11);
        let m = spawn_missile(&mut rng, &ctx, &[], &[], 1, 0.0).unwrap();
        assert_eq!(m.kind, MissileKind::Special);
        assert!(words.words("short").contains(&m.answer));
    }

    #[test]
    fn test_same_seed_same_spawns() {
        let tuning = Tuning::default();
        let words = WordBank::builtin();
        let def = tuning.wave_definition(Difficulty::Hard, 4);
        let ctx = SpawnContext {
            tuning: &tuning,
            words: &words,
            difficulty: Difficulty::Hard,
            wave: 4,
            wave_def: &def,
        };
        let launchers = vec![launcher(1, 200.0, 3), launcher(2, 600.0, 3)];
        let mut a = Pcg32::seed_from_u64(42);
        let mut b = Pcg32::seed_from_u64(42);
        for id in 0..20 {
            let ma = spawn_missile(&mut a, &ctx, &[], &launchers, id, 0.0).unwrap();
            let mb = spawn_missile(&mut b, &ctx, &[], &launchers, id, 0.0).unwrap();
            assert_eq!(ma.answer, mb.answer);
            assert_eq!(ma.pos, mb.pos);
            assert_eq!(ma.vel, mb.vel);
        }
    }
}
