//! Trial tracking and batch progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use wt_types::TrialParameters;

/// Unique batch identifier.
pub type BatchId = Uuid;

/// What a batch does with each observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchMode {
    /// Send every observation to every model as a training example.
    #[default]
    Train,
    /// Ask every model for a prediction and score it against the observation.
    Predict,
}

impl fmt::Display for BatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Train => f.write_str("train"),
            Self::Predict => f.write_str("predict"),
        }
    }
}

/// Lifecycle state for a batch of trials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchState {
    Pending,
    Running,
    Completed,
    Failed,
}

/// Aggregate progress of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchProgress {
    pub id: BatchId,
    pub mode: BatchMode,
    pub iterations: usize,
    pub state: BatchState,
    /// Jobs launched so far. Equals `iterations` once the batch completes.
    pub attempted: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl BatchProgress {
    pub fn new(mode: BatchMode, iterations: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            mode,
            iterations,
            state: BatchState::Pending,
            attempted: 0,
            succeeded: 0,
            skipped: 0,
            started_at: None,
            finished_at: None,
            error: None,
        }
    }

    pub fn mark_running(&mut self) {
        self.state = BatchState::Running;
        self.started_at = Some(Utc::now());
    }

    pub fn mark_completed(&mut self) {
        self.state = BatchState::Completed;
        self.finished_at = Some(Utc::now());
    }

    pub fn mark_failed(&mut self, error: String) {
        self.state = BatchState::Failed;
        self.finished_at = Some(Utc::now());
        self.error = Some(error);
    }

    /// Fold a finished trial into the counters.
    pub fn record(&mut self, trial: &TrialRecord) {
        match trial.status {
            TrialStatus::Completed => self.succeeded += 1,
            TrialStatus::Skipped => self.skipped += 1,
            TrialStatus::Pending | TrialStatus::Running => return,
        }
        self.attempted += 1;
    }

    pub fn remaining(&self) -> usize {
        self.iterations.saturating_sub(self.attempted)
    }
}

// ---------------------------------------------------------------------------
// Individual trial
// ---------------------------------------------------------------------------

/// One sample-launch-extract-feedback cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub id: Uuid,
    pub batch_id: BatchId,
    pub trial_number: usize,
    pub params: TrialParameters,
    pub status: TrialStatus,
    /// Extracted wall time, set only on completion.
    pub seconds: Option<u64>,
    pub exit_code: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Why the trial was skipped.
    pub skip_reason: Option<String>,
}

impl TrialRecord {
    pub fn new(batch_id: BatchId, trial_number: usize, params: TrialParameters) -> Self {
        Self {
            id: Uuid::new_v4(),
            batch_id,
            trial_number,
            params,
            status: TrialStatus::Pending,
            seconds: None,
            exit_code: None,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            skip_reason: None,
        }
    }

    pub fn mark_running(&mut self) {
        self.status = TrialStatus::Running;
        self.started_at = Some(Utc::now());
    }

    pub fn mark_completed(&mut self, seconds: u64) {
        self.status = TrialStatus::Completed;
        self.finished_at = Some(Utc::now());
        self.seconds = Some(seconds);
    }

    pub fn mark_skipped(&mut self, reason: String) {
        self.status = TrialStatus::Skipped;
        self.finished_at = Some(Utc::now());
        self.skip_reason = Some(reason);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrialStatus {
    Pending,
    Running,
    Completed,
    Skipped,
}
