//! Disco Dash - a catch-the-dancer reflex game core
//!
//! Core modules:
//! - `sim`: Deterministic session simulation (state, timers, behaviors, encounters)
//! - `highscores`: Local top-10 fallback leaderboard
//! - `leaderboard`: Remote leaderboard gateway interface and wire types
//! - `settings`: Player preferences

pub mod highscores;
pub mod leaderboard;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use leaderboard::{LeaderboardGateway, ScoreSubmission};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Lives at the start of every session
    pub const STARTING_LIVES: u8 = 3;
    /// Speed multiplier gained per point of score
    pub const SPEED_PER_POINT: f32 = 0.05;
    /// Speed multiplier ceiling
    pub const MAX_SPEED_MULTIPLIER: f32 = 3.0;

    /// Base duration of a scripted motion pattern before speed scaling
    pub const SCRIPTED_BASE_MS: u64 = 8_000;
    /// Scripted patterns never run shorter than this
    pub const SCRIPTED_MIN_MS: u64 = 2_000;
    /// Slow-motion power-up doubles pattern durations
    pub const SLOW_DURATION_FACTOR: u64 = 2;

    /// Teleport puff-out / puff-in sub-phase length
    pub const TELEPORT_PHASE_MS: u64 = 300;

    /// Dancer cursor-chase window and reposition interval
    pub const DANCER_CHASE_MS: u64 = 8_000;
    pub const DANCER_CHASE_STEP_MS: u64 = 300;
    /// Antagonist chases are shorter and faster
    pub const ANTAGONIST_CHASE_MS: u64 = 6_000;
    pub const ANTAGONIST_CHASE_STEP_MS: u64 = 200;

    /// Invisibility envelope length
    pub const INVIS_ENVELOPE_MS: u64 = 8_000;
    /// (offset, duration) of each invisible phase within the envelope
    pub const INVIS_PHASES: [(u64, u64); 3] = [(2_000, 1_500), (5_000, 1_000), (6_500, 800)];

    /// Dancer behavior roll thresholds
    pub const TELEPORT_THRESHOLD: f32 = 0.25;
    pub const CHASE_THRESHOLD: f32 = 0.40;
    pub const INVIS_THRESHOLD: f32 = 0.50;

    /// Chance per catch that the antagonist takes the next cycle
    pub const ANTAGONIST_CHANCE: f32 = 0.25;
    /// Antagonist behavior roll thresholds
    pub const ANTAGONIST_CHASE_THRESHOLD: f32 = 0.30;
    pub const ANTAGONIST_GROUP_THRESHOLD: f32 = 0.50;
    pub const ANTAGONIST_INVIS_THRESHOLD: f32 = 0.60;

    /// Decoy clone stagger and extra lifetime jitter
    pub const CLONE_STAGGER_MS: u64 = 500;
    pub const CLONE_MAX_DELAY_MS: u64 = 2_000;

    /// Golden dancer spawn chance per catch, delay, and lifetime
    pub const GOLDEN_SPAWN_CHANCE: f32 = 0.10;
    pub const GOLDEN_DELAY_MS: u64 = 2_000;
    pub const GOLDEN_LIFETIME_MS: u64 = 5_000;

    /// Delay before the next appearance after a catch
    pub const NEXT_APPEARANCE_DELAY_MS: u64 = 1_000;

    /// Per-level countdown: max(base - step * level, min) seconds
    pub const LEVEL_BASE_SECS: u64 = 60;
    pub const LEVEL_STEP_SECS: u64 = 5;
    pub const LEVEL_MIN_SECS: u64 = 20;
    /// Rush mode runs a single fixed countdown
    pub const RUSH_SECS: u64 = 30;
}
