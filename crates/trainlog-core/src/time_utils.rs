use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use crate::error::{LogError, Result};

/// Combined date-time layouts tried before falling back to a split parse.
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Calendar-date layouts, used for the split parse and for day arguments.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Clock-time layouts, 24-hour first.
const TIME_FORMATS: &[&str] = &[
    "%H:%M:%S%.f",
    "%H:%M:%S",
    "%H:%M",
    "%I:%M:%S %p",
    "%I:%M %p",
];

// ── Activity timestamps ───────────────────────────────────────────────────────

/// Parse the date-time cell of an activity row.
///
/// The whole value is first tried as a single date-time (RFC 3339 values keep
/// their local wall-clock time). When that fails the value is split on its
/// first whitespace and each side is parsed on its own, which covers exports
/// such as `"06/03/2024 7:05 AM"`.
///
/// Returns `None` when either side is missing or unparseable.
pub fn parse_activity_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    for fmt in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    let (date_part, time_part) = s.split_once(char::is_whitespace)?;
    let date = parse_date(date_part)?;
    let time = parse_time(time_part.trim())?;
    debug!("Split-parsed activity timestamp \"{}\"", s);
    Some(date.and_time(time))
}

/// Parse a calendar date in any of the supported layouts.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s.trim(), fmt).ok())
}

/// Parse a clock time in 24-hour or 12-hour (`AM`/`PM`) form.
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s.trim(), fmt).ok())
}

/// Parse a user-supplied day such as the window end (`2024-06-09`,
/// `2024/06/09`).
pub fn parse_day(s: &str) -> Result<NaiveDate> {
    parse_date(s).ok_or_else(|| LogError::DateParse(s.to_string()))
}

/// The most recent Sunday on or before `today`.
pub fn last_sunday(today: NaiveDate) -> NaiveDate {
    let back = u64::from(today.weekday().num_days_from_sunday());
    today.checked_sub_days(Days::new(back)).unwrap_or(today)
}

// ── DateWindow ────────────────────────────────────────────────────────────────

/// Inclusive range `[end − days, end]` used to filter activities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    end: NaiveDate,
    days: u32,
}

impl DateWindow {
    /// Default look-back, giving a seven-day window.
    pub const DEFAULT_DAYS: u32 = 6;

    pub fn new(end: NaiveDate, days: u32) -> Self {
        Self { end, days }
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    /// First day of the window, clamped to the earliest representable date.
    pub fn start(&self) -> NaiveDate {
        self.end
            .checked_sub_days(Days::new(u64::from(self.days)))
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start() && date <= self.end
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
