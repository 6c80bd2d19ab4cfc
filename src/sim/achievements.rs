//! One-shot achievement unlocks
//!
//! Checked after every catch; each achievement fires at most once per
//! session.

use serde::{Deserialize, Serialize};

use super::state::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Achievement {
    FirstCatch,
    DoubleDigits,
    QuarterCentury,
    HalfCentury,
    Streak5,
    Streak10,
    SpeedDemon,
    TeleportMaster,
}

impl Achievement {
    pub fn label(&self) -> &'static str {
        match self {
            Achievement::FirstCatch => "First Catch!",
            Achievement::DoubleDigits => "Double Digits!",
            Achievement::QuarterCentury => "Quarter Century!",
            Achievement::HalfCentury => "Half Century King!",
            Achievement::Streak5 => "5 Streak!",
            Achievement::Streak10 => "10 Streak Master!",
            Achievement::SpeedDemon => "Speed Demon!",
            Achievement::TeleportMaster => "Teleport Master!",
        }
    }
}

/// Per-session unlock tracker
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Achievements {
    unlocked: Vec<Achievement>,
}

impl Achievements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unlocked(&self) -> &[Achievement] {
        &self.unlocked
    }

    pub fn clear(&mut self) {
        self.unlocked.clear();
    }

    /// Check milestone conditions against the current state; returns only
    /// achievements unlocked by this call.
    pub fn check(&mut self, state: &SessionState, teleport_seen: bool) -> Vec<Achievement> {
        let mut fresh = Vec::new();
        let mut unlock = |list: &mut Vec<Achievement>, a: Achievement, hit: bool| {
            if hit && !list.contains(&a) {
                list.push(a);
                fresh.push(a);
            }
        };

        unlock(&mut self.unlocked, Achievement::FirstCatch, state.score >= 1);
        unlock(&mut self.unlocked, Achievement::DoubleDigits, state.score >= 10);
        unlock(&mut self.unlocked, Achievement::QuarterCentury, state.score >= 25);
        unlock(&mut self.unlocked, Achievement::HalfCentury, state.score >= 50);
        unlock(&mut self.unlocked, Achievement::Streak5, state.streak >= 5);
        unlock(&mut self.unlocked, Achievement::Streak10, state.streak >= 10);
        unlock(
            &mut self.unlocked,
            Achievement::SpeedDemon,
            state.speed_multiplier >= 2.0,
        );
        unlock(&mut self.unlocked, Achievement::TeleportMaster, teleport_seen);

        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::GameMode;

    #[test]
    fn test_unlocks_fire_once() {
        let mut achievements = Achievements::new();
        let mut state = SessionState::new(GameMode::Normal);
        state.apply_catch(1);

        let fresh = achievements.check(&state, false);
        assert_eq!(fresh, vec![Achievement::FirstCatch]);
        // Second check with same state unlocks nothing new
        assert!(achievements.check(&state, false).is_empty());
    }

    #[test]
    fn test_streak_and_score_milestones() {
        let mut achievements = Achievements::new();
        let mut state = SessionState::new(GameMode::Normal);
        for _ in 0..10 {
            state.apply_catch(1);
        }
        let fresh = achievements.check(&state, false);
        assert!(fresh.contains(&Achievement::FirstCatch));
        assert!(fresh.contains(&Achievement::DoubleDigits));
        assert!(fresh.contains(&Achievement::Streak5));
        assert!(fresh.contains(&Achievement::Streak10));
        assert!(!fresh.contains(&Achievement::QuarterCentury));
    }

    #[test]
    fn test_teleport_master() {
        let mut achievements = Achievements::new();
        let state = SessionState::new(GameMode::Normal);
        assert!(achievements.check(&state, false).is_empty());
        let fresh = achievements.check(&state, true);
        assert_eq!(fresh, vec![Achievement::TeleportMaster]);
    }
}
