//! Interview progress tracker.
//!
//! Tracks linear progression through the mock-interview rounds. Completing a
//! round is never gated (a later round may be marked done before an earlier
//! one), but entering round N requires round N-1 to be complete.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::interview::models::InterviewProgress;
use crate::interview::store::ProgressStore;

/// Key of the single persisted progress record.
pub const PROGRESS_KEY: &str = "interview_progress";

/// Highest round that can be completed; its successor must still fit a `u32`.
pub const MAX_ROUND: u32 = u32::MAX - 1;

pub struct ProgressTracker {
    store: Arc<dyn ProgressStore>,
    /// Serializes every write so a save never interleaves with a
    /// read-modify-write in `mark_round_complete`.
    write_lock: Mutex<()>,
}

impl ProgressTracker {
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the stored progress, or the default when nothing is stored.
    /// Unreadable or malformed records are treated as absent.
    pub fn get_progress(&self) -> InterviewProgress {
        let raw = match self.store.read(PROGRESS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return InterviewProgress::default(),
            Err(e) => {
                warn!("Error reading interview progress: {e}");
                return InterviewProgress::default();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Discarding malformed interview progress: {e}");
            InterviewProgress::default()
        })
    }

    /// Overwrites the stored progress. Best-effort: failures are logged only.
    pub fn save_progress(&self, progress: &InterviewProgress) {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        self.write_unlocked(progress);
    }

    /// Caller must hold `write_lock`.
    fn write_unlocked(&self, progress: &InterviewProgress) {
        let encoded = match serde_json::to_string(progress) {
            Ok(encoded) => encoded,
            Err(e) => {
                error!("Error encoding interview progress: {e}");
                return;
            }
        };
        if let Err(e) = self.store.write(PROGRESS_KEY, &encoded) {
            error!("Error saving interview progress: {e}");
        }
    }

    /// Records `round` as completed and moves `current_round` past it.
    ///
    /// Prerequisites are not checked, and `current_round` follows the last
    /// call even when rounds are completed out of order. `round` must not
    /// exceed `MAX_ROUND`; the HTTP layer rejects larger values.
    pub fn mark_round_complete(&self, round: u32) -> InterviewProgress {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());

        let mut progress = self.get_progress();
        if !progress.has_completed(round) {
            progress.completed_rounds.push(round);
        }
        debug_assert!(round <= MAX_ROUND, "round {round} exceeds MAX_ROUND");
        progress.current_round = round.saturating_add(1);
        if progress.started_at.is_none() {
            progress.started_at = Some(Utc::now());
        }
        self.write_unlocked(&progress);

        info!(
            "Round {round} complete; current round is now {}",
            progress.current_round
        );
        progress
    }

    /// Round 1 is always open; round N>1 opens once round N-1 is completed.
    /// Does not consult `current_round`.
    pub fn is_round_accessible(&self, round: u32) -> bool {
        if round == 1 {
            return true;
        }
        let Some(previous) = round.checked_sub(1) else {
            return false;
        };
        let accessible = self.get_progress().has_completed(previous);
        debug!("Round {round} accessible: {accessible}");
        accessible
    }

    /// Erases all stored progress.
    pub fn reset_progress(&self) {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        match self.store.delete(PROGRESS_KEY) {
            Ok(()) => info!("Interview progress reset"),
            Err(e) => error!("Error resetting interview progress: {e}"),
        }
    }

    pub fn current_round(&self) -> u32 {
        self.get_progress().current_round
    }
}
