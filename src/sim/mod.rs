//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only arrives through `tick(now_ms)`
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or storage dependencies

pub mod clock;
pub mod events;
pub mod scoring;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod targeting;
pub mod tick;

pub use clock::{ClockEdge, WaveClock};
pub use events::{EffectKind, GameEvent, ScheduledEffect};
pub use scoring::FinalScore;
pub use snapshot::{LauncherView, MissileView, Snapshot};
pub use state::{
    EntityId, GamePhase, GameState, KeystrokeStats, Launcher, Missile, MissileKind, TypingState,
};
pub use targeting::{Resolution, resolve};
pub use tick::{KeyInput, handle_key, tick};
