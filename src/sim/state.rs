//! Session state and scoring types
//!
//! Single source of truth for one play-through. All mutations flow through
//! the methods here and report their effects via return values; rendering
//! and sound react to those, never the other way around.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Game mode selected before a session starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Normal,
    Survival,
    Rush,
    Chaos,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Normal => "normal",
            GameMode::Survival => "survival",
            GameMode::Rush => "rush",
            GameMode::Chaos => "chaos",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "normal" => Some(GameMode::Normal),
            "survival" => Some(GameMode::Survival),
            "rush" => Some(GameMode::Rush),
            "chaos" => Some(GameMode::Chaos),
            _ => None,
        }
    }

    /// Rush is the only mode without the per-level countdown
    pub fn uses_level_timer(&self) -> bool {
        !matches!(self, GameMode::Rush)
    }
}

/// Timed gameplay modifiers granted by catching a golden dancer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Slow,
    DoublePoints,
    Freeze,
    Giant,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::Slow,
        PowerUpKind::DoublePoints,
        PowerUpKind::Freeze,
        PowerUpKind::Giant,
    ];

    /// How long the effect lasts once granted
    pub fn duration_ms(&self) -> u64 {
        match self {
            PowerUpKind::Slow => 10_000,
            PowerUpKind::DoublePoints => 15_000,
            PowerUpKind::Freeze => 3_000,
            PowerUpKind::Giant => 8_000,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PowerUpKind::Slow => "Slow Motion",
            PowerUpKind::DoublePoints => "Double Points",
            PowerUpKind::Freeze => "Freeze",
            PowerUpKind::Giant => "Giant Mode",
        }
    }
}

/// Background theme tier, unlocked by score
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum ThemeTier {
    #[default]
    Default,
    Neon,
    Cosmic,
    Retro,
    Matrix,
    Cyberpunk,
}

impl ThemeTier {
    const TIERS: [(ThemeTier, u32); 6] = [
        (ThemeTier::Default, 0),
        (ThemeTier::Neon, 50),
        (ThemeTier::Cosmic, 150),
        (ThemeTier::Retro, 300),
        (ThemeTier::Matrix, 500),
        (ThemeTier::Cyberpunk, 700),
    ];

    /// Highest tier whose score gate the given score clears
    pub fn for_score(score: u32) -> Self {
        Self::TIERS
            .iter()
            .rev()
            .find(|(_, min)| score >= *min)
            .map(|(tier, _)| *tier)
            .unwrap_or_default()
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ThemeTier::Default => "Deep Space",
            ThemeTier::Neon => "Neon City",
            ThemeTier::Cosmic => "Cosmic Void",
            ThemeTier::Retro => "Retro Grid",
            ThemeTier::Matrix => "Matrix Code",
            ThemeTier::Cyberpunk => "Cyberpunk Alley",
        }
    }
}

/// Result of a successful catch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatchResult {
    /// Points actually awarded after power-up multipliers
    pub points: u32,
    /// Set when this catch crossed into a new theme tier (one-time celebration)
    pub theme_unlocked: Option<ThemeTier>,
}

/// Whether the session survives an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterOutcome {
    Continue,
    /// Lives hit zero; emitted exactly once per session
    GameOver,
}

impl EncounterOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, EncounterOutcome::GameOver)
    }
}

/// Mutable state of one play-through
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub score: u32,
    pub streak: u32,
    pub max_streak: u32,
    pub lives: u8,
    pub speed_multiplier: f32,
    pub mode: GameMode,
    /// Current level (1-based); drives the per-level countdown
    pub level: u32,
    pub theme: ThemeTier,
    /// At most one instance of each kind; expiry is timer-driven
    active_power_ups: Vec<PowerUpKind>,
    /// False once lives hit zero or the rush countdown expires
    pub active: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(GameMode::Normal)
    }
}

impl SessionState {
    pub fn new(mode: GameMode) -> Self {
        Self {
            score: 0,
            streak: 0,
            max_streak: 0,
            lives: STARTING_LIVES,
            speed_multiplier: 1.0,
            mode,
            level: 1,
            theme: ThemeTier::Default,
            active_power_ups: Vec::new(),
            active: true,
        }
    }

    /// Restore initial values, keeping the selected mode. Idempotent; the
    /// owning resolver cancels all timers alongside this.
    pub fn reset(&mut self) {
        let mode = self.mode;
        *self = Self::new(mode);
    }

    /// Apply a successful dancer catch.
    ///
    /// Streak and score bookkeeping, speed recompute (unless slow motion is
    /// active), and theme tier advance. The theme never regresses within a
    /// session.
    pub fn apply_catch(&mut self, base_points: u32) -> CatchResult {
        let mut points = base_points;
        if self.has_power_up(PowerUpKind::DoublePoints) {
            points *= 2;
        }

        self.score += points;
        self.streak += 1;
        self.max_streak = self.max_streak.max(self.streak);

        if !self.has_power_up(PowerUpKind::Slow) {
            self.speed_multiplier =
                (1.0 + self.score as f32 * SPEED_PER_POINT).min(MAX_SPEED_MULTIPLIER);
        }

        let tier = ThemeTier::for_score(self.score);
        let theme_unlocked = if tier > self.theme {
            self.theme = tier;
            log::info!("Theme unlocked: {}", tier.display_name());
            Some(tier)
        } else {
            None
        };

        CatchResult {
            points,
            theme_unlocked,
        }
    }

    /// A missed click: lose a life, streak gone.
    pub fn apply_miss(&mut self) -> EncounterOutcome {
        self.lose_life()
    }

    /// Caught the antagonist (or one of its clones): same cost as a miss.
    pub fn apply_penalty(&mut self) -> EncounterOutcome {
        self.lose_life()
    }

    fn lose_life(&mut self) -> EncounterOutcome {
        self.lives = self.lives.saturating_sub(1);
        self.streak = 0;
        if self.lives == 0 {
            self.active = false;
            log::info!("Session over at score {}", self.score);
            EncounterOutcome::GameOver
        } else {
            EncounterOutcome::Continue
        }
    }

    /// End the session without touching lives (rush countdown expiry).
    pub fn end(&mut self) {
        self.active = false;
    }

    /// Grant a power-up. Re-granting an active kind does not stack; the
    /// caller restarts its expiry timer instead.
    pub fn grant_power_up(&mut self, kind: PowerUpKind) {
        if !self.active_power_ups.contains(&kind) {
            self.active_power_ups.push(kind);
        }
        // Slow overrides the score-derived multiplier while active
        if kind == PowerUpKind::Slow {
            self.speed_multiplier = 1.0;
        }
    }

    /// Remove an expired power-up. Idempotent.
    pub fn expire_power_up(&mut self, kind: PowerUpKind) {
        self.active_power_ups.retain(|k| *k != kind);
        // Recompute speed once slow motion ends
        if kind == PowerUpKind::Slow {
            self.speed_multiplier =
                (1.0 + self.score as f32 * SPEED_PER_POINT).min(MAX_SPEED_MULTIPLIER);
        }
    }

    pub fn has_power_up(&self, kind: PowerUpKind) -> bool {
        self.active_power_ups.contains(&kind)
    }

    pub fn active_power_ups(&self) -> &[PowerUpKind] {
        &self.active_power_ups
    }

    /// Seconds on the current level countdown: max(base - step * level, min)
    pub fn level_time_limit_secs(&self) -> u64 {
        (LEVEL_BASE_SECS.saturating_sub(LEVEL_STEP_SECS * self.level as u64)).max(LEVEL_MIN_SECS)
    }
}
