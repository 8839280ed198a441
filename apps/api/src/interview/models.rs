use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted record of a user's progress through the interview rounds.
///
/// Stored as JSON with camelCase keys. `current_round` normally equals
/// `1 + max(completed_rounds)`, but that is only maintained by
/// `ProgressTracker::mark_round_complete` and never checked on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewProgress {
    pub completed_rounds: Vec<u32>,
    pub current_round: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
}

impl Default for InterviewProgress {
    fn default() -> Self {
        Self {
            completed_rounds: Vec::new(),
            current_round: 1,
            started_at: None,
        }
    }
}

impl InterviewProgress {
    pub fn has_completed(&self, round: u32) -> bool {
        self.completed_rounds.contains(&round)
    }
}
