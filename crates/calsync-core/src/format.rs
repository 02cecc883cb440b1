//! Normalized record -> calendar event payload.

use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::FormatError;
use crate::records::{
    Activity, ActivityCategory, ExerciseSession, NormalizedRecord, SleepSession, TimeZoneSetting,
    WakeCategory,
};

/// Duration used when an exercise session has no recorded length.
pub const DEFAULT_EXERCISE_MINUTES: f64 = 30.0;

/// Logical destination calendar for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarSelector {
    PersonalActivity,
    WorkActivity,
    Fitness,
    NormalWakeUp,
    SleepIn,
}

impl CalendarSelector {
    pub const ALL: [CalendarSelector; 5] = [
        CalendarSelector::PersonalActivity,
        CalendarSelector::WorkActivity,
        CalendarSelector::Fitness,
        CalendarSelector::NormalWakeUp,
        CalendarSelector::SleepIn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CalendarSelector::PersonalActivity => "personal_activity",
            CalendarSelector::WorkActivity => "work_activity",
            CalendarSelector::Fitness => "fitness",
            CalendarSelector::NormalWakeUp => "normal_wake_up",
            CalendarSelector::SleepIn => "sleep_in",
        }
    }
}

impl fmt::Display for CalendarSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When an event happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventSpan {
    AllDay(NaiveDate),
    Timed {
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    },
}

impl EventSpan {
    /// Signed length of a timed span; zero for all-day events.
    pub fn duration(&self) -> Duration {
        match self {
            EventSpan::AllDay(_) => Duration::zero(),
            EventSpan::Timed { start, end } => *end - *start,
        }
    }
}

/// Everything the calendar service needs to create one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    pub title: String,
    pub description: String,
    pub span: EventSpan,
    pub calendar: CalendarSelector,
}

pub fn format_event(
    record: &NormalizedRecord,
    zone: &TimeZoneSetting,
) -> Result<EventPayload, FormatError> {
    match record {
        NormalizedRecord::Activity(activity) => format_activity(activity),
        NormalizedRecord::Exercise(session) => format_exercise(session, zone),
        NormalizedRecord::Sleep(session) => format_sleep(session, zone),
    }
}

pub fn format_activity(activity: &Activity) -> Result<EventPayload, FormatError> {
    let date = activity.date.ok_or(FormatError::MissingDate)?;
    let calendar = match activity.category {
        ActivityCategory::Personal => CalendarSelector::PersonalActivity,
        ActivityCategory::Work => CalendarSelector::WorkActivity,
    };

    Ok(EventPayload {
        title: activity_title(activity),
        description: activity_description(activity),
        span: EventSpan::AllDay(date),
        calendar,
    })
}

pub fn activity_title(activity: &Activity) -> String {
    let lines = if activity.lines_changed() > 0 {
        format!(
            " (+{}/-{} lines)",
            activity.lines_added, activity.lines_deleted
        )
    } else {
        String::new()
    };
    format!(
        "{}: {} commits{}",
        activity.short_repository(),
        activity.commit_count,
        lines
    )
}

fn activity_description(activity: &Activity) -> String {
    let mut description = format!("💻 {}\n", activity.repository);
    description.push_str(&format!("📊 {} commits\n", activity.commit_count));
    if activity.lines_changed() > 0 {
        description.push_str(&format!(
            "📈 +{}/-{} lines\n",
            activity.lines_added, activity.lines_deleted
        ));
    }

    let prs = activity.pr_titles.trim();
    if prs.is_empty() {
        description.push_str("🔀 PR: None\n");
    } else {
        description.push_str(&format!("🔀 PR: {}\n", activity.pr_titles));
    }

    description.push_str(&format!("\n📝 Commits:\n{}", activity.commit_messages));
    description
}

pub fn format_exercise(
    session: &ExerciseSession,
    zone: &TimeZoneSetting,
) -> Result<EventPayload, FormatError> {
    let start = match &session.start_time {
        Some(explicit) => explicit.resolve(zone)?,
        None => zone.noon(session.date.ok_or(FormatError::MissingDate)?)?,
    };

    let minutes = if session.duration_minutes > 0.0 {
        session.duration_minutes
    } else {
        DEFAULT_EXERCISE_MINUTES
    };
    let end = Duration::try_milliseconds((minutes * 60_000.0).round() as i64)
        .and_then(|length| start.checked_add_signed(length))
        .ok_or(FormatError::DurationOutOfRange)?;

    let title = if session.distance_miles > 0.0 {
        format!("{} - {} miles", session.kind, session.distance_miles)
    } else {
        session.name.clone()
    };

    let mut description = format!("🏃‍♂️ {}\n", session.name);
    description.push_str(&format!("⏱️ Duration: {} minutes\n", session.duration_minutes));
    if session.distance_miles > 0.0 {
        description.push_str(&format!("📏 Distance: {} miles\n", session.distance_miles));
    }
    description.push_str(&format!("📊 Activity Type: {}", session.kind));

    Ok(EventPayload {
        title,
        description,
        span: EventSpan::Timed { start, end },
        calendar: CalendarSelector::Fitness,
    })
}

/// Sleep spans are taken verbatim. A wake time before bedtime is passed
/// through as a negative-length event.
pub fn format_sleep(
    session: &SleepSession,
    zone: &TimeZoneSetting,
) -> Result<EventPayload, FormatError> {
    let start = session
        .bedtime
        .ok_or(FormatError::MissingTimestamp { field: "bedtime" })?
        .resolve(zone)?;
    let end = session
        .wake_time
        .ok_or(FormatError::MissingTimestamp { field: "wake time" })?
        .resolve(zone)?;

    let title = format!(
        "Sleep - {}hrs ({}% efficiency)",
        session.duration_hours, session.efficiency_percent
    );

    let mut description = format!("😴 {}\n", session.label);
    description.push_str(&format!("⏱️ Duration: {} hours\n", session.duration_hours));
    description.push_str(&format!("📊 Efficiency: {}%\n\n", session.efficiency_percent));
    description.push_str("🛌 Sleep Stages:\n");
    description.push_str(&format!("• Deep Sleep: {} min\n", session.deep_minutes));
    description.push_str(&format!("• REM Sleep: {} min\n", session.rem_minutes));
    description.push_str(&format!("• Light Sleep: {} min\n\n", session.light_minutes));

    let calendar = match session.wake_category {
        WakeCategory::NormalWakeUp => CalendarSelector::NormalWakeUp,
        WakeCategory::SleepIn => CalendarSelector::SleepIn,
    };

    Ok(EventPayload {
        title,
        description,
        span: EventSpan::Timed { start, end },
        calendar,
    })
}
