//! Remote leaderboard gateway
//!
//! Wire types for the score-submission backend plus the trait the game
//! core consumes. Submission is fire-and-forget: a failure never reaches
//! gameplay, it just routes the entry into the local high score store.

use serde::{Deserialize, Serialize};

use crate::highscores::{HighScoreEntry, HighScores};
use crate::sim::{GameMode, SessionSummary};

/// Longest accepted player name after sanitation
pub const MAX_NAME_LEN: usize = 20;

/// Errors at the leaderboard boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Name empty after sanitation
    InvalidName,
    /// Transport or backend failure; the entry goes to local fallback
    Unavailable(String),
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::InvalidName => write!(f, "invalid player name"),
            GatewayError::Unavailable(reason) => write!(f, "leaderboard unavailable: {reason}"),
        }
    }
}

impl std::error::Error for GatewayError {}

/// A finished session on its way to the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub name: String,
    pub score: u32,
    pub mode: GameMode,
    pub streak: u32,
}

impl ScoreSubmission {
    /// Build a submission from a session summary, sanitizing the name the
    /// same way the backend does: trim, cap length, then strip angle
    /// brackets. An empty name falls back to "Anonymous"; a name that is
    /// empty after sanitation is rejected.
    pub fn new(name: &str, summary: &SessionSummary) -> Result<Self, GatewayError> {
        let trimmed = name.trim();
        let name = if trimmed.is_empty() {
            "Anonymous".to_string()
        } else {
            let sanitized: String = trimmed
                .chars()
                .take(MAX_NAME_LEN)
                .filter(|c| *c != '<' && *c != '>')
                .collect();
            if sanitized.trim().is_empty() {
                return Err(GatewayError::InvalidName);
            }
            sanitized
        };
        Ok(Self {
            name,
            score: summary.score,
            mode: summary.mode,
            streak: summary.max_streak,
        })
    }
}

/// One row of the remote leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
    pub mode: GameMode,
    pub streak: u32,
    /// Backend timestamp, ISO-8601
    pub created_at: String,
}

/// Backend acknowledgement of a submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub entry: Option<LeaderboardEntry>,
}

/// The consumed interface of the score backend. Implementations own the
/// transport; the core never waits on one.
pub trait LeaderboardGateway {
    fn submit(&mut self, submission: &ScoreSubmission) -> Result<SubmitResponse, GatewayError>;

    /// Top entries, score descending. Display-only; the core never depends
    /// on the content.
    fn fetch_top(&self) -> Result<Vec<LeaderboardEntry>, GatewayError>;
}

/// Where a submission ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitDestination {
    Remote,
    /// Remote failed; stored locally (rank if it qualified)
    Local(Option<usize>),
}

/// Submit a finished session, degrading to the local store on any gateway
/// failure. Gameplay never sees the error.
pub fn submit_or_fallback(
    gateway: &mut dyn LeaderboardGateway,
    local: &mut HighScores,
    submission: ScoreSubmission,
    now_ms: f64,
) -> SubmitDestination {
    match gateway.submit(&submission) {
        Ok(response) if response.success => SubmitDestination::Remote,
        Ok(_) | Err(_) => {
            log::warn!("Score submission failed; keeping entry locally");
            let rank = local.add_entry(HighScoreEntry {
                name: submission.name,
                score: submission.score,
                mode: submission.mode,
                streak: submission.streak,
                timestamp: now_ms,
            });
            local.save();
            SubmitDestination::Local(rank)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(score: u32) -> SessionSummary {
        SessionSummary {
            score,
            max_streak: 7,
            mode: GameMode::Rush,
        }
    }

    /// Gateway double that always fails
    struct DownGateway;

    impl LeaderboardGateway for DownGateway {
        fn submit(&mut self, _: &ScoreSubmission) -> Result<SubmitResponse, GatewayError> {
            Err(GatewayError::Unavailable("connection refused".into()))
        }

        fn fetch_top(&self) -> Result<Vec<LeaderboardEntry>, GatewayError> {
            Err(GatewayError::Unavailable("connection refused".into()))
        }
    }

    /// Gateway double that records submissions
    #[derive(Default)]
    struct RecordingGateway {
        seen: Vec<ScoreSubmission>,
    }

    impl LeaderboardGateway for RecordingGateway {
        fn submit(&mut self, s: &ScoreSubmission) -> Result<SubmitResponse, GatewayError> {
            self.seen.push(s.clone());
            Ok(SubmitResponse {
                success: true,
                entry: None,
            })
        }

        fn fetch_top(&self) -> Result<Vec<LeaderboardEntry>, GatewayError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_name_sanitation() {
        let s = ScoreSubmission::new("  <b>Dancer</b>  ", &summary(5)).unwrap();
        assert_eq!(s.name, "bDancer/b");

        let s = ScoreSubmission::new("", &summary(5)).unwrap();
        assert_eq!(s.name, "Anonymous");

        let s = ScoreSubmission::new("<><>", &summary(5));
        assert_eq!(s, Err(GatewayError::InvalidName));

        let long = "x".repeat(40);
        let s = ScoreSubmission::new(&long, &summary(5)).unwrap();
        assert_eq!(s.name.len(), MAX_NAME_LEN);
    }

    #[test]
    fn test_truncation_happens_before_bracket_strip() {
        // Brackets inside the first 20 chars shorten the final name instead
        // of pulling in characters from beyond the cap
        let name = format!("ab<>{}", "x".repeat(30));
        let s = ScoreSubmission::new(&name, &summary(5)).unwrap();
        assert_eq!(s.name, format!("ab{}", "x".repeat(16)));

        // A name whose first 20 chars are all brackets is invalid even
        // though printable characters follow
        let name = format!("{}abcdef", "<".repeat(MAX_NAME_LEN));
        assert_eq!(
            ScoreSubmission::new(&name, &summary(5)),
            Err(GatewayError::InvalidName)
        );
    }

    #[test]
    fn test_submission_carries_max_streak() {
        let s = ScoreSubmission::new("p", &summary(42)).unwrap();
        assert_eq!(s.score, 42);
        assert_eq!(s.streak, 7);
        assert_eq!(s.mode, GameMode::Rush);
    }

    #[test]
    fn test_remote_success_skips_local() {
        let mut gateway = RecordingGateway::default();
        let mut local = HighScores::new();
        let s = ScoreSubmission::new("p", &summary(42)).unwrap();
        let dest = submit_or_fallback(&mut gateway, &mut local, s, 0.0);
        assert_eq!(dest, SubmitDestination::Remote);
        assert_eq!(gateway.seen.len(), 1);
        assert!(local.is_empty());
    }

    #[test]
    fn test_failure_falls_back_to_local() {
        let mut gateway = DownGateway;
        let mut local = HighScores::new();
        let s = ScoreSubmission::new("p", &summary(42)).unwrap();
        let dest = submit_or_fallback(&mut gateway, &mut local, s, 123.0);
        assert_eq!(dest, SubmitDestination::Local(Some(1)));
        assert_eq!(local.top_score(), Some(42));
    }

    #[test]
    fn test_wire_shape_matches_backend() {
        let s = ScoreSubmission::new("p", &summary(3)).unwrap();
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["name"], "p");
        assert_eq!(json["score"], 3);
        assert_eq!(json["streak"], 7);
    }
}
