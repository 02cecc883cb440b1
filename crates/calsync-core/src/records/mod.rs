//! Normalized record model.
//!
//! Each source database holds one kind of record. Raw pages are parsed once
//! by [`transform`] into the typed variants below, with defaults applied at
//! that boundary so downstream code never deals with missing fields.

pub mod loose;
pub mod transform;

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use loose::{LooseDateTime, TimeZoneSetting};
pub use transform::normalize;

/// Name of the checkbox property that marks a record as synchronized.
pub const PROCESSED_PROPERTY: &str = "Calendar Created";

/// The kind of record held by a source database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Activity,
    Exercise,
    Sleep,
}

impl Domain {
    /// Date property used to scope window queries.
    pub fn date_property(&self) -> &'static str {
        match self {
            Domain::Activity | Domain::Exercise => "Date",
            Domain::Sleep => "Night of Date",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Activity => "activity",
            Domain::Exercise => "exercise",
            Domain::Sleep => "sleep",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A page as returned by the records source: its id and property bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: String,
    pub properties: serde_json::Value,
}

impl RawRecord {
    pub fn new(id: impl Into<String>, properties: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            properties,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityCategory {
    Personal,
    Work,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WakeCategory {
    NormalWakeUp,
    SleepIn,
}

/// A day of commits against one repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub repository: String,
    pub date: Option<NaiveDate>,
    pub commit_count: u64,
    pub category: ActivityCategory,
    pub commit_messages: String,
    pub pr_titles: String,
    pub lines_added: u64,
    pub lines_deleted: u64,
}

impl Activity {
    pub fn lines_changed(&self) -> u64 {
        self.lines_added + self.lines_deleted
    }

    /// Repository name without its owner prefix (`owner/name` -> `name`).
    pub fn short_repository(&self) -> &str {
        match self.repository.split('/').nth(1) {
            Some(name) if !name.is_empty() => name,
            _ => &self.repository,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSession {
    pub id: String,
    pub name: String,
    pub date: Option<NaiveDate>,
    pub kind: String,
    /// Only set when the source value carried a time of day.
    pub start_time: Option<LooseDateTime>,
    pub duration_minutes: f64,
    pub distance_miles: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepSession {
    pub id: String,
    pub label: String,
    pub night_of_date: Option<NaiveDate>,
    pub bedtime: Option<LooseDateTime>,
    pub wake_time: Option<LooseDateTime>,
    pub duration_hours: f64,
    pub deep_minutes: f64,
    pub rem_minutes: f64,
    pub light_minutes: f64,
    pub efficiency_percent: f64,
    pub wake_category: WakeCategory,
}

/// One record of any domain, after defaulting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NormalizedRecord {
    Activity(Activity),
    Exercise(ExerciseSession),
    Sleep(SleepSession),
}

impl NormalizedRecord {
    pub fn id(&self) -> &str {
        match self {
            NormalizedRecord::Activity(a) => &a.id,
            NormalizedRecord::Exercise(e) => &e.id,
            NormalizedRecord::Sleep(s) => &s.id,
        }
    }

    pub fn domain(&self) -> Domain {
        match self {
            NormalizedRecord::Activity(_) => Domain::Activity,
            NormalizedRecord::Exercise(_) => Domain::Exercise,
            NormalizedRecord::Sleep(_) => Domain::Sleep,
        }
    }

    /// Human-identifying field used in progress and failure reports.
    pub fn label(&self) -> &str {
        match self {
            NormalizedRecord::Activity(a) => &a.repository,
            NormalizedRecord::Exercise(e) => &e.name,
            NormalizedRecord::Sleep(s) => &s.label,
        }
    }
}
