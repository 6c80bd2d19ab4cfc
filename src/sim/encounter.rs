//! Encounter resolution and session control
//!
//! Translates raw input events (catch, miss, antagonist hits) into state
//! transitions and schedules every follow-up through the timer registry.
//! `advance` is the only way simulated time passes, which keeps whole
//! sessions replayable from a seed.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::achievements::{Achievement, Achievements};
use super::behavior::{Behavior, BehaviorPlan, BehaviorSelector, EntityKind};
use super::state::{EncounterOutcome, GameMode, PowerUpKind, SessionState, ThemeTier};
use super::timers::{TimerKind, TimerRegistry};
use crate::consts::*;

/// Golden dancer lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GoldenState {
    #[default]
    None,
    /// Rolled, appears after a short delay
    Pending,
    /// On screen; catching it grants a power-up
    Visible,
}

/// Final stats of a finished session, handed to the leaderboard path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub score: u32,
    pub max_streak: u32,
    pub mode: GameMode,
}

/// Observable things that happened while time advanced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    GoldenAppeared,
    GoldenFaded,
    PowerUpExpired(PowerUpKind),
    /// Level countdown expired but the session survives
    LevelAdvanced(u32),
    CloneAppeared(u32),
    CloneLeft(u32),
    /// Antagonist cycle ended; dancer resumes
    AntagonistLeft,
    /// Emitted exactly once per session
    SessionEnded(SessionSummary),
}

/// Everything a successful dancer catch produced
#[derive(Debug, Clone, PartialEq)]
pub struct CatchOutcome {
    pub points: u32,
    pub theme_unlocked: Option<ThemeTier>,
    /// Set when this catch was the golden dancer
    pub power_up: Option<PowerUpKind>,
    pub achievements: Vec<Achievement>,
}

/// One running play-through: state, timers, and behavior slots under a
/// single owner. All randomness comes through the injected RNG.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    state: SessionState,
    timers: TimerRegistry,
    selector: BehaviorSelector,
    achievements: Achievements,
    golden: GoldenState,
    /// Antagonist currently owns the cycle (dancer hidden)
    antagonist_active: bool,
    /// Live decoy clone ids
    clones: Vec<u32>,
    next_clone_id: u32,
    teleport_seen: bool,
    summary_sent: bool,
}

impl Session {
    pub fn new(mode: GameMode) -> Self {
        Self {
            state: SessionState::new(mode),
            timers: TimerRegistry::new(),
            selector: BehaviorSelector::new(),
            achievements: Achievements::new(),
            golden: GoldenState::None,
            antagonist_active: false,
            clones: Vec::new(),
            next_clone_id: 0,
            teleport_seen: false,
            summary_sent: false,
        }
    }

    /// Begin play: fresh state, first dancer behavior, mode countdown.
    pub fn start(&mut self, rng: &mut impl Rng) {
        self.reset();
        self.respawn_dancer(rng);
        match self.state.mode {
            GameMode::Rush => {
                self.timers
                    .schedule_once(TimerKind::RushCountdown, RUSH_SECS * 1_000);
            }
            _ => self.schedule_level_countdown(),
        }
        log::info!("Session started ({})", self.state.mode.as_str());
    }

    /// Back to the initial state. Cancels every pending timer so nothing
    /// scheduled by the previous session can fire into this one. Safe to
    /// call at any point, any number of times.
    pub fn reset(&mut self) {
        self.timers.cancel_all();
        self.state.reset();
        self.selector.clear();
        self.achievements.clear();
        self.golden = GoldenState::None;
        self.antagonist_active = false;
        self.clones.clear();
        self.teleport_seen = false;
        self.summary_sent = false;
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn behavior_of(&self, entity: EntityKind) -> Behavior {
        self.selector.behavior_of(entity)
    }

    pub fn golden(&self) -> GoldenState {
        self.golden
    }

    pub fn antagonist_active(&self) -> bool {
        self.antagonist_active
    }

    pub fn live_clones(&self) -> &[u32] {
        &self.clones
    }

    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    #[cfg(test)]
    pub(crate) fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    /// Advance simulated time, firing due timers in deadline order.
    pub fn advance(&mut self, ms: u64, rng: &mut impl Rng) -> Vec<SimEvent> {
        let target = self.timers.now_ms() + ms;
        let mut events = Vec::new();
        while let Some(kind) = self.timers.pop_due(target) {
            self.dispatch(kind, rng, &mut events);
        }
        self.timers.settle(target);
        events
    }

    /// Player caught the dancer. `None` when the session is inactive or the
    /// antagonist currently owns the cycle (the dancer is hidden then, so a
    /// forwarded click on it is stale).
    pub fn catch_dancer(&mut self, rng: &mut impl Rng) -> Option<CatchOutcome> {
        if !self.state.active || self.antagonist_active {
            return None;
        }

        // Golden catch grants a random power-up and reverts the spawn
        let power_up = if self.golden == GoldenState::Visible {
            self.golden = GoldenState::None;
            self.timers.cancel_kind(TimerKind::GoldenRevert);
            let kind = PowerUpKind::ALL[rng.random_range(0..PowerUpKind::ALL.len())];
            self.grant_power_up(kind);
            Some(kind)
        } else {
            None
        };

        let result = self.state.apply_catch(1);

        // Fresh behavior immediately, plus the delayed re-roll that may
        // bring the antagonist instead
        self.respawn_dancer(rng);
        self.timers.cancel_kind(TimerKind::NextAppearance);
        self.timers
            .schedule_once(TimerKind::NextAppearance, NEXT_APPEARANCE_DELAY_MS);

        // Rare golden spawn, suppressed while one is pending or visible
        if self.golden == GoldenState::None && rng.random::<f32>() < GOLDEN_SPAWN_CHANCE {
            self.golden = GoldenState::Pending;
            self.timers
                .schedule_once(TimerKind::GoldenSpawn, GOLDEN_DELAY_MS);
        }

        let achievements = self.achievements.check(&self.state, self.teleport_seen);

        Some(CatchOutcome {
            points: result.points,
            theme_unlocked: result.theme_unlocked,
            power_up,
            achievements,
        })
    }

    /// Player hit the antagonist: lose a life, antagonist leaves, dancer
    /// resumes (unless that was the last life).
    pub fn catch_antagonist(&mut self, rng: &mut impl Rng) -> Option<EncounterOutcome> {
        if !self.state.active {
            return None;
        }
        let outcome = self.state.apply_penalty();
        if outcome.is_terminal() {
            self.finish();
        } else {
            self.end_antagonist_cycle();
            self.respawn_dancer(rng);
        }
        Some(outcome)
    }

    /// Player hit a decoy clone: full penalty, clone disappears, the rest
    /// of the antagonist cycle continues.
    pub fn catch_clone(&mut self, clone_id: u32) -> Option<EncounterOutcome> {
        if !self.state.active || !self.clones.contains(&clone_id) {
            return None;
        }
        self.clones.retain(|id| *id != clone_id);
        self.timers.cancel_kind(TimerKind::CloneExpiry(clone_id));
        let outcome = self.state.apply_penalty();
        if outcome.is_terminal() {
            self.finish();
        }
        Some(outcome)
    }

    /// Pointer interaction outside any interactive region.
    pub fn miss(&mut self) -> Option<EncounterOutcome> {
        if !self.state.active {
            return None;
        }
        let outcome = self.state.apply_miss();
        if outcome.is_terminal() {
            self.finish();
        }
        Some(outcome)
    }

    fn dispatch(&mut self, kind: TimerKind, rng: &mut impl Rng, events: &mut Vec<SimEvent>) {
        match kind {
            TimerKind::LevelCountdown => {
                let outcome = self.state.apply_miss();
                if outcome.is_terminal() {
                    events.push(SimEvent::SessionEnded(self.finish()));
                } else {
                    self.state.level += 1;
                    self.schedule_level_countdown();
                    events.push(SimEvent::LevelAdvanced(self.state.level));
                }
            }
            TimerKind::RushCountdown => {
                // Rush ends the session outright, lives notwithstanding
                self.state.end();
                events.push(SimEvent::SessionEnded(self.finish()));
            }
            TimerKind::PowerUpExpiry(kind) => {
                self.state.expire_power_up(kind);
                events.push(SimEvent::PowerUpExpired(kind));
            }
            TimerKind::GoldenSpawn => {
                self.golden = GoldenState::Visible;
                self.timers
                    .schedule_once(TimerKind::GoldenRevert, GOLDEN_LIFETIME_MS);
                events.push(SimEvent::GoldenAppeared);
            }
            TimerKind::GoldenRevert => {
                self.golden = GoldenState::None;
                events.push(SimEvent::GoldenFaded);
            }
            TimerKind::NextAppearance => {
                if self.antagonist_active {
                    return;
                }
                if rng.random::<f32>() < ANTAGONIST_CHANCE {
                    self.begin_antagonist_cycle(rng);
                } else {
                    self.respawn_dancer(rng);
                }
            }
            TimerKind::BehaviorExpiry(EntityKind::Dancer) => {
                // Behavior loops back into a fresh selection while the
                // session lives; the active check is what keeps a late
                // expiry from rescheduling after game over
                self.selector.expire(EntityKind::Dancer);
                if self.state.active && !self.antagonist_active {
                    self.respawn_dancer(rng);
                }
            }
            TimerKind::BehaviorExpiry(EntityKind::Antagonist) => {
                self.end_antagonist_cycle();
                events.push(SimEvent::AntagonistLeft);
                if self.state.active {
                    self.respawn_dancer(rng);
                }
            }
            TimerKind::TeleportPhase(entity) => {
                let plan = self.selector.on_teleport_phase(
                    entity,
                    rng,
                    self.state.speed_multiplier,
                    self.state.has_power_up(PowerUpKind::Slow),
                );
                self.apply_plan(plan);
            }
            TimerKind::InvisToggle { entity, hidden } => {
                self.selector.set_hidden(entity, hidden);
            }
            TimerKind::CloneSpawn(_) => {
                let id = self.next_clone_id;
                self.next_clone_id += 1;
                self.clones.push(id);
                let jitter: u64 = rng.random_range(0..=CLONE_MAX_DELAY_MS);
                let lifetime = super::behavior::scripted_duration_ms(
                    self.state.speed_multiplier,
                    self.state.has_power_up(PowerUpKind::Slow),
                ) + jitter;
                self.timers
                    .schedule_once(TimerKind::CloneExpiry(id), lifetime);
                events.push(SimEvent::CloneAppeared(id));
            }
            TimerKind::CloneExpiry(id) => {
                self.clones.retain(|c| *c != id);
                events.push(SimEvent::CloneLeft(id));
            }
        }
    }

    /// Fresh dancer behavior, replacing any timers of the previous one
    fn respawn_dancer(&mut self, rng: &mut impl Rng) {
        self.clear_entity_timers(EntityKind::Dancer);
        let plan = self.selector.select_dancer(
            rng,
            self.state.speed_multiplier,
            self.state.has_power_up(PowerUpKind::Slow),
        );
        self.apply_plan(plan);
    }

    fn begin_antagonist_cycle(&mut self, rng: &mut impl Rng) {
        self.antagonist_active = true;
        self.clear_entity_timers(EntityKind::Dancer);
        self.selector.expire(EntityKind::Dancer);
        let plan = self.selector.select_antagonist(
            rng,
            self.state.speed_multiplier,
            self.state.has_power_up(PowerUpKind::Slow),
        );
        self.apply_plan(plan);
    }

    fn end_antagonist_cycle(&mut self) {
        self.antagonist_active = false;
        self.selector.expire(EntityKind::Antagonist);
        self.clear_entity_timers(EntityKind::Antagonist);
        self.clones.clear();
        // Live clones and pending staggered spawns die with the cycle
        self.timers.cancel_where(|kind| {
            matches!(kind, TimerKind::CloneSpawn(_) | TimerKind::CloneExpiry(_))
        });
    }

    fn grant_power_up(&mut self, kind: PowerUpKind) {
        self.state.grant_power_up(kind);
        // Re-grant restarts the effect window rather than stacking
        self.timers.cancel_kind(TimerKind::PowerUpExpiry(kind));
        self.timers
            .schedule_once(TimerKind::PowerUpExpiry(kind), kind.duration_ms());
        log::debug!("Power-up granted: {}", kind.label());
    }

    fn apply_plan(&mut self, plan: BehaviorPlan) {
        if matches!(plan.behavior, Behavior::Teleport { .. }) {
            self.teleport_seen = true;
        }
        for (kind, delay) in plan.timers {
            self.timers.schedule_once(kind, delay);
        }
    }

    fn clear_entity_timers(&mut self, entity: EntityKind) {
        self.timers.cancel_kind(TimerKind::BehaviorExpiry(entity));
        self.timers.cancel_kind(TimerKind::TeleportPhase(entity));
        self.timers.cancel_kind(TimerKind::InvisToggle {
            entity,
            hidden: true,
        });
        self.timers.cancel_kind(TimerKind::InvisToggle {
            entity,
            hidden: false,
        });
    }

    fn schedule_level_countdown(&mut self) {
        self.timers.schedule_once(
            TimerKind::LevelCountdown,
            self.state.level_time_limit_secs() * 1_000,
        );
    }

    /// Tear down a finished session and produce its summary. All timers are
    /// cancelled here, so nothing scheduled before the end can fire after.
    fn finish(&mut self) -> SessionSummary {
        debug_assert!(!self.summary_sent, "session finished twice");
        self.summary_sent = true;
        self.timers.cancel_all();
        self.selector.clear();
        self.clones.clear();
        self.antagonist_active = false;
        self.golden = GoldenState::None;
        SessionSummary {
            score: self.state.score,
            max_streak: self.state.max_streak,
            mode: self.state.mode,
        }
    }

    /// Summary for a session ended by an input event (where the caller got
    /// an `EncounterOutcome` rather than a `SimEvent`).
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            score: self.state.score,
            max_streak: self.state.max_streak,
            mode: self.state.mode,
        }
    }
}
