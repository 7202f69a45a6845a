//! QWERTY Command - headless runner
//!
//! Plays a full session with a scripted typist on a simulated 60 Hz clock and
//! prints the result. Usage:
//!
//! ```text
//! qwerty-command [--seed N] [--tuning FILE] [--words FILE] [--settings FILE] [--scores FILE]
//! ```

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("QWERTY Command (headless) starting...");

    let options = runner::Options::from_args(std::env::args().skip(1));
    runner::run(&options);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser hosts drive `qwerty_command::Game` directly
}

#[cfg(not(target_arch = "wasm32"))]
mod runner {
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use qwerty_command::audio::{AudioCues, SoundEffect};
    use qwerty_command::persistence::{FileScoreService, ScoreService};
    use qwerty_command::sim::{EntityId, GameEvent, GamePhase, GameState, KeyInput};
    use qwerty_command::{Game, Settings, Tuning, WordBank};
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Scripted typist speed
    const KEY_INTERVAL_MS: f64 = 140.0;
    const TYPO_CHANCE: f64 = 0.04;
    /// Stop a runaway session after this much game time
    const TIME_LIMIT_MS: f64 = 20.0 * 60.0 * 1000.0;

    #[derive(Debug, Default)]
    pub struct Options {
        seed: Option<u64>,
        tuning: Option<PathBuf>,
        words: Option<PathBuf>,
        settings: Option<PathBuf>,
        scores: Option<PathBuf>,
    }

    impl Options {
        pub fn from_args(mut args: impl Iterator<Item = String>) -> Self {
            let mut options = Self::default();
            while let Some(flag) = args.next() {
                let Some(value) = args.next() else {
                    log::warn!("Missing value for {}", flag);
                    break;
                };
                match flag.as_str() {
                    "--seed" => match value.parse() {
                        Ok(seed) => options.seed = Some(seed),
                        Err(e) => log::warn!("Ignoring seed {:?}: {}", value, e),
                    },
                    "--tuning" => options.tuning = Some(value.into()),
                    "--words" => options.words = Some(value.into()),
                    "--settings" => options.settings = Some(value.into()),
                    "--scores" => options.scores = Some(value.into()),
                    other => log::warn!("Unknown option {}", other),
                }
            }
            options
        }
    }

    pub fn run(options: &Options) {
        let tuning = options
            .tuning
            .as_deref()
            .map(Tuning::load_or_default)
            .unwrap_or_default();
        let words = options
            .words
            .as_deref()
            .map(WordBank::load_or_default)
            .unwrap_or_else(WordBank::builtin);
        let settings = options
            .settings
            .as_deref()
            .map(Settings::load)
            .unwrap_or_default();
        let scores_path = options
            .scores
            .clone()
            .unwrap_or_else(|| PathBuf::from("qwerty-command-scores.json"));

        let start_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0);
        let seed = options.seed.unwrap_or(start_ms as u64);

        let audio = AudioCues::from_settings(&settings);
        log::info!(
            "Difficulty {}, sfx volume {:.2}",
            settings.difficulty.as_str(),
            audio.effective_volume()
        );
        let mut service = FileScoreService::new(scores_path);
        let mut game = Game::new(tuning, words, settings);
        let mut typist = Typist::new(seed);

        game.start_game(seed, start_ms);
        game.service_pending(&mut service);

        let mut now = start_ms;
        let mut destroyed = 0usize;
        let mut sounds = 0usize;
        while game.phase() != GamePhase::GameOver && now - start_ms < TIME_LIMIT_MS {
            now += FRAME_MS;
            game.tick(now);
            if let Some(state) = game.session()
                && let Some(key) = typist.next_key(state, now)
            {
                game.handle_key(key);
            }

            let events = game.drain_events();
            for event in &events {
                match event {
                    GameEvent::MissileDestroyed { .. } => destroyed += 1,
                    GameEvent::WaveAnnounced { wave, name } => {
                        log::info!("Wave {}: {}", wave, name)
                    }
                    GameEvent::LauncherDestroyed { launcher_id } => {
                        log::info!("Launcher {} destroyed", launcher_id)
                    }
                    _ => {}
                }
            }
            for cue in audio.cues(&events) {
                sounds += 1;
                if cue.effect == SoundEffect::HighScore {
                    log::info!("New best score!");
                }
            }
            game.drain_effects();
        }

        game.service_pending(&mut service);
        for event in game.drain_events() {
            if event == GameEvent::ScoresLocalOnly {
                log::warn!("Scores kept locally; {} unavailable", service.path().display());
            }
        }

        let Some(result) = game.session().and_then(|s| s.final_score) else {
            println!("Session stopped after {:.0} s without a result", (now - start_ms) / 1000.0);
            return;
        };
        println!("\n=== GAME OVER ===");
        println!("Wave reached:   {}", result.wave);
        println!("Missiles:       {}", destroyed);
        println!("Accuracy:       {:.1}%", result.accuracy);
        println!("Running score:  {}", result.running_score);
        println!("Multiplier:     x{}", result.multiplier);
        println!("Final score:    {}", result.score);
        if let Some(best) = game.best() {
            println!("Best on record: {} (wave {})", best.score, best.wave);
        }

        let difficulty = game.settings.difficulty;
        match service.high_scores(Some(difficulty), 5) {
            Ok(top) if !top.is_empty() => {
                println!("\nTop scores ({}):", difficulty.as_str());
                for (i, entry) in top.iter().enumerate() {
                    println!(
                        "{:>2}. {:<12} {:>8}  wave {}",
                        i + 1,
                        entry.player_name,
                        entry.score,
                        entry.wave
                    );
                }
            }
            Ok(_) => {}
            Err(e) => log::warn!("Leaderboard unavailable: {}", e),
        }
        if let Some(name) = &game.settings.player_name
            && let Ok(Some(entry)) = service.player_best(name)
        {
            println!("Best for {}:   {} (wave {})", name, entry.score, entry.wave);
        }
        log::debug!("{} sound cues", sounds);
    }

    /// Types the answer of the lowest missile, with occasional slips
    struct Typist {
        rng: Pcg32,
        next_key_ms: f64,
        target: Option<EntityId>,
    }

    impl Typist {
        fn new(seed: u64) -> Self {
            Self {
                rng: Pcg32::seed_from_u64(seed ^ 0x5EED),
                next_key_ms: 0.0,
                target: None,
            }
        }

        fn next_key(&mut self, state: &GameState, now: f64) -> Option<KeyInput> {
            if now < self.next_key_ms {
                return None;
            }
            self.next_key_ms = now + KEY_INTERVAL_MS;

            match state.phase {
                GamePhase::WaitingToStart => return Some(KeyInput::Enter),
                GamePhase::Running => {}
                _ => return None,
            }

            if state.typing.error_count > 0 {
                return Some(KeyInput::Backspace);
            }

            let typed = state.typing.valid_len();
            if typed == 0 {
                self.target = state
                    .missiles
                    .iter()
                    .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                    .map(|m| m.id);
            }
            let Some(missile) = self.target.and_then(|id| state.missile(id)) else {
                self.target = None;
                return (typed > 0).then_some(KeyInput::Enter);
            };

            if self.rng.random_bool(TYPO_CHANCE) {
                return Some(KeyInput::Char('#'));
            }
            missile.answer.chars().nth(typed).map(KeyInput::Char)
        }
    }
}
