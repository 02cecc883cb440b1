//! Date windows used to scope a sync run.
//!
//! A year is partitioned into 52 seven-day periods. Period 1 starts on the
//! Sunday on or before January 1, so every period runs Sunday through
//! Saturday regardless of month boundaries.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Number of addressable periods in a year.
pub const PERIODS_PER_YEAR: u32 = 52;

/// Inclusive calendar-day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Window {
    start: NaiveDate,
    end: NaiveDate,
}

impl Window {
    /// Build an explicit range. Fails when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// A window covering exactly one day.
    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Last instant of the window (23:59:59.999 on `end`).
    pub fn end_instant(&self) -> NaiveDateTime {
        self.end.and_time(last_instant_of_day())
    }

    /// Inclusive number of days covered.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_single_day(&self) -> bool {
        self.start == self.end
    }
}

fn last_instant_of_day() -> NaiveTime {
    // 23:59:59.999 is always a valid time; the fallback is unreachable.
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

/// Start of period 1: the Sunday on or before January 1 of `year`.
pub fn first_period_start(year: i32) -> Option<NaiveDate> {
    let jan_first = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let back = i64::from(jan_first.weekday().num_days_from_sunday());
    jan_first.checked_sub_signed(Duration::days(back))
}

/// Compute the seven-day window for `period_index` (1-based) of `year`.
pub fn compute_window(year: i32, period_index: u32) -> Result<Window, ValidationError> {
    if !(1..=PERIODS_PER_YEAR).contains(&period_index) {
        return Err(ValidationError::PeriodOutOfRange {
            index: period_index,
        });
    }

    let out_of_range = || ValidationError::InvalidValue {
        field: "year".to_string(),
        message: format!("{year} is outside the supported calendar range"),
    };

    let start = first_period_start(year)
        .and_then(|first| {
            first.checked_add_signed(Duration::days(7 * i64::from(period_index - 1)))
        })
        .ok_or_else(out_of_range)?;
    let end = start
        .checked_add_signed(Duration::days(6))
        .ok_or_else(out_of_range)?;
    Ok(Window { start, end })
}

/// The trailing seven days ending on `today`, inclusive.
pub fn last_seven_days(today: NaiveDate) -> Result<Window, ValidationError> {
    let start = today
        .checked_sub_signed(Duration::days(6))
        .ok_or_else(|| ValidationError::InvalidValue {
            field: "date".to_string(),
            message: format!("{today} is too close to the start of the calendar"),
        })?;
    Ok(Window { start, end: today })
}

/// Display label such as `"Jan 12 – Jan 18"`.
///
/// Years are spelled out only when the window crosses a year boundary.
pub fn describe_window(window: &Window) -> String {
    if window.is_single_day() {
        return window.start.format("%b %-d").to_string();
    }

    if window.start.year() == window.end.year() {
        format!(
            "{} – {}",
            window.start.format("%b %-d"),
            window.end.format("%b %-d")
        )
    } else {
        format!(
            "{} – {}",
            window.start.format("%b %-d, %Y"),
            window.end.format("%b %-d, %Y")
        )
    }
}
