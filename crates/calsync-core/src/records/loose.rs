use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::FormatError;

const FLOATING_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// A timestamp read from free text: either a fixed instant or a wall-clock
/// time that still needs a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LooseDateTime {
    /// RFC 3339 value with an explicit offset.
    Offset(DateTime<FixedOffset>),
    /// Date and time without any zone information.
    Floating(NaiveDateTime),
}

impl LooseDateTime {
    /// Parse a timestamp that carries a time of day. Date-only text and
    /// anything unrecognized yield `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(LooseDateTime::Offset(dt));
        }
        FLOATING_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
            .map(LooseDateTime::Floating)
    }

    /// Pin to a concrete instant, interpreting floating values in `zone`.
    pub fn resolve(&self, zone: &TimeZoneSetting) -> Result<DateTime<FixedOffset>, FormatError> {
        match self {
            LooseDateTime::Offset(dt) => Ok(*dt),
            LooseDateTime::Floating(naive) => zone.localize(naive),
        }
    }
}

/// Zone used for wall-clock times (noon defaults, floating timestamps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeZoneSetting {
    /// Zone of the machine running the sync.
    #[default]
    Local,
    Named(Tz),
}

impl TimeZoneSetting {
    pub fn localize(&self, naive: &NaiveDateTime) -> Result<DateTime<FixedOffset>, FormatError> {
        let resolved = match self {
            TimeZoneSetting::Local => Local
                .from_local_datetime(naive)
                .earliest()
                .map(|dt| dt.fixed_offset()),
            TimeZoneSetting::Named(tz) => tz
                .from_local_datetime(naive)
                .earliest()
                .map(|dt| dt.fixed_offset()),
        };
        resolved.ok_or(FormatError::AmbiguousLocalTime(*naive))
    }

    /// Noon on `date` in this zone.
    pub fn noon(&self, date: NaiveDate) -> Result<DateTime<FixedOffset>, FormatError> {
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN);
        self.localize(&date.and_time(noon))
    }
}

impl FromStr for TimeZoneSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("local") {
            return Ok(TimeZoneSetting::Local);
        }
        s.parse::<Tz>()
            .map(TimeZoneSetting::Named)
            .map_err(|e| format!("unknown time zone '{s}': {e}"))
    }
}

impl fmt::Display for TimeZoneSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeZoneSetting::Local => f.write_str("local"),
            TimeZoneSetting::Named(tz) => f.write_str(tz.name()),
        }
    }
}
