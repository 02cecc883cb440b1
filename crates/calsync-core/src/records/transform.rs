//! Raw page -> [`NormalizedRecord`] conversion.
//!
//! These functions never fail. Missing or mistyped properties fall back to
//! fixed defaults so a half-filled page still produces a syncable record.

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use super::{
    Activity, ActivityCategory, Domain, ExerciseSession, LooseDateTime, NormalizedRecord,
    RawRecord, SleepSession, WakeCategory,
};

pub const DEFAULT_REPOSITORY: &str = "Unknown Repository";
pub const DEFAULT_WORKOUT: &str = "Workout";
pub const DEFAULT_SLEEP_LABEL: &str = "Unknown";

/// Normalize a raw record of the given domain.
pub fn normalize(domain: Domain, raw: &RawRecord) -> NormalizedRecord {
    match domain {
        Domain::Activity => NormalizedRecord::Activity(normalize_activity(raw)),
        Domain::Exercise => NormalizedRecord::Exercise(normalize_exercise(raw)),
        Domain::Sleep => NormalizedRecord::Sleep(normalize_sleep(raw)),
    }
}

pub fn normalize_activity(raw: &RawRecord) -> Activity {
    let props = Props(&raw.properties);
    let category = match props.select("Project Type") {
        Some("Work") => ActivityCategory::Work,
        _ => ActivityCategory::Personal,
    };

    Activity {
        id: raw.id.clone(),
        repository: props
            .title("Repository")
            .unwrap_or_else(|| DEFAULT_REPOSITORY.to_string()),
        date: props.date("Date"),
        commit_count: props.count("Commits Count"),
        category,
        commit_messages: props.rich_text("Commit Messages").unwrap_or_default(),
        pr_titles: props.rich_text("PR Titles").unwrap_or_default(),
        lines_added: props.count("Lines Added"),
        lines_deleted: props.count("Lines Deleted"),
    }
}

pub fn normalize_exercise(raw: &RawRecord) -> ExerciseSession {
    let props = Props(&raw.properties);

    // Only text with a time component counts as an explicit start.
    let start_time = props
        .rich_text("Start Time")
        .filter(|text| text.contains('T'))
        .and_then(|text| LooseDateTime::parse(&text));

    ExerciseSession {
        id: raw.id.clone(),
        name: props
            .title("Activity Name")
            .unwrap_or_else(|| DEFAULT_WORKOUT.to_string()),
        date: props.date("Date"),
        kind: props
            .select("Activity Type")
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_WORKOUT.to_string()),
        start_time,
        duration_minutes: props.non_negative("Duration"),
        distance_miles: props.non_negative("Distance"),
    }
}

pub fn normalize_sleep(raw: &RawRecord) -> SleepSession {
    let props = Props(&raw.properties);
    let wake_category = match props.select("Google Calendar") {
        Some("Normal Wake Up") => WakeCategory::NormalWakeUp,
        _ => WakeCategory::SleepIn,
    };

    SleepSession {
        id: raw.id.clone(),
        label: props
            .title("Night of")
            .unwrap_or_else(|| DEFAULT_SLEEP_LABEL.to_string()),
        night_of_date: props.date("Night of Date"),
        bedtime: props
            .rich_text("Bedtime")
            .and_then(|text| LooseDateTime::parse(&text)),
        wake_time: props
            .rich_text("Wake Time")
            .and_then(|text| LooseDateTime::parse(&text)),
        duration_hours: props.non_negative("Sleep Duration"),
        deep_minutes: props.non_negative("Deep Sleep"),
        rem_minutes: props.non_negative("REM Sleep"),
        light_minutes: props.non_negative("Light Sleep"),
        efficiency_percent: props.non_negative("Efficiency").min(100.0),
        wake_category,
    }
}

/// Typed accessors over a Notion `properties` object.
struct Props<'a>(&'a Value);

impl Props<'_> {
    fn title(&self, name: &str) -> Option<String> {
        self.text_fragments(name, "title")
    }

    fn rich_text(&self, name: &str) -> Option<String> {
        self.text_fragments(name, "rich_text")
    }

    fn text_fragments(&self, name: &str, kind: &str) -> Option<String> {
        let text: String = self.0[name][kind]
            .as_array()?
            .iter()
            .filter_map(|fragment| fragment["plain_text"].as_str())
            .collect();
        (!text.is_empty()).then_some(text)
    }

    fn number(&self, name: &str) -> Option<f64> {
        self.0[name]["number"].as_f64().filter(|n| n.is_finite())
    }

    fn non_negative(&self, name: &str) -> f64 {
        self.number(name).unwrap_or(0.0).max(0.0)
    }

    fn count(&self, name: &str) -> u64 {
        self.non_negative(name).round() as u64
    }

    fn select(&self, name: &str) -> Option<&str> {
        self.0[name]["select"]["name"].as_str()
    }

    fn date(&self, name: &str) -> Option<NaiveDate> {
        let start = self.0[name]["date"]["start"].as_str()?;
        parse_date(start)
    }
}

/// Accepts `YYYY-MM-DD` as well as full timestamps, keeping the wall-clock date.
fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            LooseDateTime::parse(text).map(|loose| match loose {
                LooseDateTime::Offset(dt) => dt.date_naive(),
                LooseDateTime::Floating(dt) => dt.date(),
            })
        })
}
