//! Local high score fallback
//!
//! When the remote leaderboard is unreachable, finished sessions land here:
//! top 10 by score descending, persisted to LocalStorage on the web.

use serde::{Deserialize, Serialize};

use crate::sim::GameMode;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single locally stored score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: u32,
    pub mode: GameMode,
    /// Best streak of the session
    pub streak: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Local leaderboard, sorted by score descending
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "disco_dash_highscores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a new score (if it qualifies). Returns the rank achieved
    /// (1-indexed) or None if it didn't make the cut.
    pub fn add_entry(&mut self, entry: HighScoreEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }

        // Find insertion point (sorted descending by score)
        let pos = self.entries.iter().position(|e| entry.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        // Trim to max size
        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(scores) = serde_json::from_str::<HighScores>(&json) {
                    log::info!("Loaded {} high scores", scores.entries.len());
                    return scores;
                }
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("High scores saved ({} entries)", self.entries.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, score: u32) -> HighScoreEntry {
        HighScoreEntry {
            name: name.to_string(),
            score,
            mode: GameMode::Normal,
            streak: 0,
            timestamp: 0.0,
        }
    }

    #[test]
    fn test_sorted_descending_and_capped() {
        let mut scores = HighScores::new();
        for i in 0..15u32 {
            scores.add_entry(entry("p", i + 1));
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.top_score(), Some(15));
        let sorted: Vec<u32> = scores.entries.iter().map(|e| e.score).collect();
        let mut expected = sorted.clone();
        expected.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(sorted, expected);
        // 1-5 fell off the bottom
        assert_eq!(scores.entries.last().unwrap().score, 6);
    }

    #[test]
    fn test_zero_score_never_qualifies() {
        let mut scores = HighScores::new();
        assert!(!scores.qualifies(0));
        assert_eq!(scores.add_entry(entry("p", 0)), None);
    }

    #[test]
    fn test_rank_reported() {
        let mut scores = HighScores::new();
        scores.add_entry(entry("a", 100));
        scores.add_entry(entry("b", 50));
        assert_eq!(scores.potential_rank(75), Some(2));
        assert_eq!(scores.add_entry(entry("c", 75)), Some(2));
        assert_eq!(scores.entries[1].name, "c");
    }

    #[test]
    fn test_low_score_rejected_when_full() {
        let mut scores = HighScores::new();
        for i in 0..10u32 {
            scores.add_entry(entry("p", (i + 1) * 10));
        }
        assert!(!scores.qualifies(5));
        assert_eq!(scores.add_entry(entry("late", 5)), None);
    }
}
