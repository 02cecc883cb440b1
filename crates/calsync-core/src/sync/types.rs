//! Core types for a sync run.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RecordSyncError;
use crate::records::{ActivityCategory, Domain};

/// One independently runnable unit of synchronization.
///
/// Both activity targets read the activity database and split it by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncTarget {
    PersonalActivity,
    WorkActivity,
    Exercise,
    Sleep,
}

impl SyncTarget {
    /// Run order for "all".
    pub const ALL: [SyncTarget; 4] = [
        SyncTarget::PersonalActivity,
        SyncTarget::WorkActivity,
        SyncTarget::Exercise,
        SyncTarget::Sleep,
    ];

    pub fn domain(&self) -> Domain {
        match self {
            SyncTarget::PersonalActivity | SyncTarget::WorkActivity => Domain::Activity,
            SyncTarget::Exercise => Domain::Exercise,
            SyncTarget::Sleep => Domain::Sleep,
        }
    }

    /// Client-side category filter, for activity targets only.
    pub fn category(&self) -> Option<ActivityCategory> {
        match self {
            SyncTarget::PersonalActivity => Some(ActivityCategory::Personal),
            SyncTarget::WorkActivity => Some(ActivityCategory::Work),
            SyncTarget::Exercise | SyncTarget::Sleep => None,
        }
    }

    /// Name shown to the user.
    pub fn label(&self) -> &'static str {
        match self {
            SyncTarget::PersonalActivity => "Personal Activity",
            SyncTarget::WorkActivity => "Work Activity",
            SyncTarget::Exercise => "Exercise",
            SyncTarget::Sleep => "Sleep",
        }
    }
}

impl fmt::Display for SyncTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pipeline step at which a record failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Format,
    Insert,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Format => f.write_str("format"),
            FailureStage::Insert => f.write_str("insert"),
        }
    }
}

/// A record that was left unprocessed by this run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordFailure {
    pub id: String,
    /// Human-identifying field (repository, workout name, sleep label).
    pub label: String,
    pub stage: FailureStage,
    pub reason: String,
}

impl RecordFailure {
    pub fn new(id: &str, label: &str, error: &RecordSyncError) -> Self {
        let stage = match error {
            RecordSyncError::Format(_) => FailureStage::Format,
            RecordSyncError::Insert(_) => FailureStage::Insert,
        };
        Self {
            id: id.to_string(),
            label: label.to_string(),
            stage,
            reason: error.to_string(),
        }
    }
}

/// Outcome of one target's batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub target: SyncTarget,
    /// Unprocessed records returned by the source, before category filtering.
    pub fetched: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: Vec<RecordFailure>,
    /// Ids whose event was created but whose processed flag could not be set.
    /// Counted in `succeeded`; a rerun will create them again.
    pub unmarked: Vec<String>,
}

impl SyncSummary {
    pub fn empty(target: SyncTarget) -> Self {
        Self {
            target,
            fetched: 0,
            attempted: 0,
            succeeded: 0,
            failed: Vec::new(),
            unmarked: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.unmarked.is_empty()
    }

    pub fn summary_line(&self) -> String {
        format!(
            "{}: attempted {}, succeeded {}, failed {}",
            self.target,
            self.attempted,
            self.succeeded,
            self.failed.len()
        )
    }
}
