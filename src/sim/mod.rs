//! Deterministic session simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time advances only through the timer registry
//! - Seeded RNG only, injected at every decision point
//! - No rendering, audio, or platform dependencies

pub mod achievements;
pub mod behavior;
pub mod encounter;
pub mod state;
pub mod timers;

pub use achievements::{Achievement, Achievements};
pub use behavior::{
    AntagonistMove, Behavior, BehaviorSelector, DancerMove, EntityKind, MotionPattern,
    TeleportPhase, scripted_duration_ms,
};
pub use encounter::{CatchOutcome, GoldenState, Session, SessionSummary, SimEvent};
pub use state::{
    CatchResult, EncounterOutcome, GameMode, PowerUpKind, SessionState, ThemeTier,
};
pub use timers::{TimerId, TimerKind, TimerRegistry};
