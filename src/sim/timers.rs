//! Timer registry for the session
//!
//! Every scheduled callback in the game is a row here instead of a closure
//! held by the platform. Firing order is deterministic (deadline, then
//! insertion id), and `cancel_all` removes everything at once, so a reset
//! can never leave a stale timer behind to mutate the next session.

use serde::{Deserialize, Serialize};

use super::behavior::EntityKind;
use super::state::PowerUpKind;

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerKind {
    /// Per-level countdown expired (Normal/Survival/Chaos)
    LevelCountdown,
    /// Fixed rush countdown expired; ends the session outright
    RushCountdown,
    /// A power-up effect wore off
    PowerUpExpiry(PowerUpKind),
    /// Golden dancer appears
    GoldenSpawn,
    /// Uncaught golden dancer reverts to normal
    GoldenRevert,
    /// Post-catch delay over; roll the next appearance
    NextAppearance,
    /// An entity's behavior window ended
    BehaviorExpiry(EntityKind),
    /// Teleport sub-phase boundary (out -> in -> landed)
    TeleportPhase(EntityKind),
    /// Hide or show during an invisibility envelope
    InvisToggle { entity: EntityKind, hidden: bool },
    /// A staggered decoy clone enters
    CloneSpawn(u32),
    /// A decoy clone leaves on its own
    CloneExpiry(u32),
}

/// Cancel handle for one scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Timer {
    id: u64,
    kind: TimerKind,
    fires_at: u64,
}

/// Deadline-ordered one-shot timers with explicit cancellation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimerRegistry {
    now_ms: u64,
    next_id: u64,
    timers: Vec<Timer>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Schedule a one-shot timer `delay_ms` from now
    pub fn schedule_once(&mut self, kind: TimerKind, delay_ms: u64) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            kind,
            fires_at: self.now_ms + delay_ms,
        });
        TimerId(id)
    }

    /// Cancel one timer; a handle that already fired is a no-op
    pub fn cancel(&mut self, id: TimerId) {
        self.timers.retain(|t| t.id != id.0);
    }

    /// Cancel every pending timer of the given kind
    pub fn cancel_kind(&mut self, kind: TimerKind) {
        self.timers.retain(|t| t.kind != kind);
    }

    /// Cancel every pending timer matching the predicate; covers kinds that
    /// carry per-instance ids (clone spawns/expiries) in one pass
    pub fn cancel_where(&mut self, mut pred: impl FnMut(TimerKind) -> bool) {
        self.timers.retain(|t| !pred(t.kind));
    }

    /// Cancel everything. After this no previously scheduled timer can fire.
    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    pub fn has_kind(&self, kind: TimerKind) -> bool {
        self.timers.iter().any(|t| t.kind == kind)
    }

    /// Earliest pending deadline, if any
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.iter().map(|t| t.fires_at).min()
    }

    /// Pop the earliest timer due at or before `limit_ms`, advancing the
    /// clock to its deadline. Callers drain due timers one at a time so a
    /// handler that cancels later timers takes effect immediately.
    pub fn pop_due(&mut self, limit_ms: u64) -> Option<TimerKind> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.fires_at <= limit_ms)
            .min_by_key(|(_, t)| (t.fires_at, t.id))
            .map(|(i, _)| i)?;
        let timer = self.timers.swap_remove(idx);
        self.now_ms = self.now_ms.max(timer.fires_at);
        Some(timer.kind)
    }

    /// Move the clock forward once all due timers are drained
    pub fn settle(&mut self, target_ms: u64) {
        debug_assert!(self.next_deadline().is_none_or(|d| d > target_ms));
        self.now_ms = self.now_ms.max(target_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_deadline_order() {
        let mut reg = TimerRegistry::new();
        reg.schedule_once(TimerKind::GoldenRevert, 500);
        reg.schedule_once(TimerKind::GoldenSpawn, 200);
        reg.schedule_once(TimerKind::NextAppearance, 900);

        assert_eq!(reg.pop_due(1_000), Some(TimerKind::GoldenSpawn));
        assert_eq!(reg.now_ms(), 200);
        assert_eq!(reg.pop_due(1_000), Some(TimerKind::GoldenRevert));
        assert_eq!(reg.pop_due(1_000), Some(TimerKind::NextAppearance));
        assert_eq!(reg.pop_due(1_000), None);
        reg.settle(1_000);
        assert_eq!(reg.now_ms(), 1_000);
    }

    #[test]
    fn test_ties_break_by_insertion_order() {
        let mut reg = TimerRegistry::new();
        reg.schedule_once(TimerKind::GoldenSpawn, 100);
        reg.schedule_once(TimerKind::GoldenRevert, 100);
        assert_eq!(reg.pop_due(100), Some(TimerKind::GoldenSpawn));
        assert_eq!(reg.pop_due(100), Some(TimerKind::GoldenRevert));
    }

    #[test]
    fn test_not_due_not_fired() {
        let mut reg = TimerRegistry::new();
        reg.schedule_once(TimerKind::LevelCountdown, 5_000);
        assert_eq!(reg.pop_due(4_999), None);
        reg.settle(4_999);
        assert_eq!(reg.pop_due(5_000), Some(TimerKind::LevelCountdown));
    }

    #[test]
    fn test_cancel_by_handle() {
        let mut reg = TimerRegistry::new();
        let id = reg.schedule_once(TimerKind::GoldenSpawn, 100);
        reg.schedule_once(TimerKind::GoldenRevert, 200);
        reg.cancel(id);
        assert_eq!(reg.pop_due(1_000), Some(TimerKind::GoldenRevert));
        assert_eq!(reg.pop_due(1_000), None);
        // Cancelling again is a no-op
        reg.cancel(id);
    }

    #[test]
    fn test_cancel_kind() {
        let mut reg = TimerRegistry::new();
        reg.schedule_once(TimerKind::CloneSpawn(0), 100);
        reg.schedule_once(TimerKind::CloneSpawn(1), 200);
        reg.schedule_once(TimerKind::NextAppearance, 300);
        reg.cancel_kind(TimerKind::CloneSpawn(0));
        reg.cancel_kind(TimerKind::CloneSpawn(1));
        assert_eq!(reg.pending(), 1);
        assert_eq!(reg.pop_due(1_000), Some(TimerKind::NextAppearance));
    }

    #[test]
    fn test_cancel_where_spans_instance_ids() {
        let mut reg = TimerRegistry::new();
        reg.schedule_once(TimerKind::CloneSpawn(0), 100);
        reg.schedule_once(TimerKind::CloneSpawn(7), 200);
        reg.schedule_once(TimerKind::CloneExpiry(3), 300);
        reg.schedule_once(TimerKind::NextAppearance, 400);
        reg.cancel_where(|k| {
            matches!(k, TimerKind::CloneSpawn(_) | TimerKind::CloneExpiry(_))
        });
        assert_eq!(reg.pending(), 1);
        assert_eq!(reg.pop_due(1_000), Some(TimerKind::NextAppearance));
    }

    #[test]
    fn test_cancel_all_leaves_nothing() {
        let mut reg = TimerRegistry::new();
        for i in 0..10 {
            reg.schedule_once(TimerKind::CloneExpiry(i), 100 * (i as u64 + 1));
        }
        reg.cancel_all();
        assert_eq!(reg.pending(), 0);
        assert_eq!(reg.pop_due(u64::MAX), None);
    }

    #[test]
    fn test_clock_monotonic_across_schedules() {
        let mut reg = TimerRegistry::new();
        reg.schedule_once(TimerKind::GoldenSpawn, 100);
        assert_eq!(reg.pop_due(100), Some(TimerKind::GoldenSpawn));
        // New timers are relative to the advanced clock
        reg.schedule_once(TimerKind::GoldenRevert, 50);
        assert_eq!(reg.next_deadline(), Some(150));
    }
}
