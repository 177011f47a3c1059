use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Positional day labels used for placeholder keys.
///
/// Offset 0 from the anchor date is always `MONDAY`, whatever weekday the
/// anchor actually falls on.
pub const DAY_LABELS: [&str; 7] = [
    "MONDAY",
    "TUESDAY",
    "WEDNESDAY",
    "THURSDAY",
    "FRIDAY",
    "SATURDAY",
    "SUNDAY",
];

/// Placeholder key holding the rounded weekly distance total.
pub const WEEKLY_DISTANCE_KEY: &str = "WEEKLY_DISTANCE";

/// Time-of-day bucket an activity falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Clock hour 0–11.
    Morning,
    /// Clock hour 12–23.
    Afternoon,
}

impl Period {
    /// Both periods in rendering order.
    pub const ALL: [Period; 2] = [Period::Morning, Period::Afternoon];

    /// Classify a clock time against the noon boundary.
    pub fn from_time(time: NaiveTime) -> Self {
        if time.hour() < 12 {
            Period::Morning
        } else {
            Period::Afternoon
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Period::Morning => "morning",
            Period::Afternoon => "afternoon",
        }
    }

    /// Suffix used in placeholder keys (`TIME_MONDAY_MORN`).
    pub fn key_suffix(self) -> &'static str {
        match self {
            Period::Morning => "MORN",
            Period::Afternoon => "AFTER",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One raw row of the activity export, after column-name resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Combined date and clock-time text, e.g. `"2024-06-03 07:00:00"`.
    pub date_time: String,
    /// Elapsed time as displayed by the export, e.g. `"00:25:00"`.
    pub time: String,
    /// Distance text; converted to a number when the report is built.
    pub distance: String,
    /// Average pace as displayed by the export.
    pub pace: String,
}

/// An [`ActivityRecord`] with its calendar date and period resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub date: NaiveDate,
    pub time_of_day: NaiveTime,
    pub period: Period,
    pub time: String,
    pub distance: String,
    pub pace: String,
}

impl NormalizedRecord {
    /// Project the record onto the fields shown in the report.
    pub fn to_run_entry(&self) -> RunEntry {
        RunEntry {
            time: self.time.clone(),
            distance: self.distance.clone(),
            pace: self.pace.clone(),
        }
    }
}

/// A single run as it appears in a report cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunEntry {
    pub time: String,
    pub distance: String,
    pub pace: String,
}

/// Morning and afternoon runs of one calendar day, in encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayRuns {
    pub morning: Vec<RunEntry>,
    pub afternoon: Vec<RunEntry>,
}

impl DayRuns {
    pub fn runs(&self, period: Period) -> &[RunEntry] {
        match period {
            Period::Morning => &self.morning,
            Period::Afternoon => &self.afternoon,
        }
    }

    pub fn runs_mut(&mut self, period: Period) -> &mut Vec<RunEntry> {
        match period {
            Period::Morning => &mut self.morning,
            Period::Afternoon => &mut self.afternoon,
        }
    }

    /// Total number of runs across both periods.
    pub fn len(&self) -> usize {
        self.morning.len() + self.afternoon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Runs grouped by calendar day (ascending) and period.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    days: BTreeMap<NaiveDate, DayRuns>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `entry` to the list for `(date, period)`.
    pub fn push(&mut self, date: NaiveDate, period: Period, entry: RunEntry) {
        self.days
            .entry(date)
            .or_default()
            .runs_mut(period)
            .push(entry);
    }

    /// The earliest date present; the base of the 7-day rendering loop.
    pub fn anchor_date(&self) -> Option<NaiveDate> {
        self.days.keys().next().copied()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayRuns> {
        self.days.get(&date)
    }

    /// Days in ascending date order.
    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &DayRuns)> {
        self.days.iter()
    }

    /// Number of distinct days.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Number of runs across every day and period.
    pub fn run_count(&self) -> usize {
        self.days.values().map(DayRuns::len).sum()
    }
}

/// Flat placeholder → display-string mapping handed to a renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RenderContext {
    values: BTreeMap<String, String>,
}

impl RenderContext {
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Every key a complete context must carry, in label order.
    pub fn expected_keys() -> Vec<String> {
        let mut keys = Vec::with_capacity(DAY_LABELS.len() * 7 + 1);
        for day in DAY_LABELS {
            keys.push(format!("DATE_{day}"));
            for period in Period::ALL {
                let suffix = period.key_suffix();
                keys.push(format!("TIME_{day}_{suffix}"));
                keys.push(format!("DIST_{day}_{suffix}"));
                keys.push(format!("PACE_{day}_{suffix}"));
            }
        }
        keys.push(WEEKLY_DISTANCE_KEY.to_string());
        keys
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn run(time: &str) -> RunEntry {
        RunEntry {
            time: time.to_string(),
            distance: "1.0".to_string(),
            pace: "5:00".to_string(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    // ── Period ────────────────────────────────────────────────────────────────

    #[test]
    fn test_period_noon_boundary() {
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        assert_eq!(Period::from_time(t(0, 0)), Period::Morning);
        assert_eq!(Period::from_time(t(11, 59)), Period::Morning);
        assert_eq!(Period::from_time(t(12, 0)), Period::Afternoon);
        assert_eq!(Period::from_time(t(23, 59)), Period::Afternoon);
    }

    #[test]
    fn test_period_labels() {
        assert_eq!(Period::Morning.key_suffix(), "MORN");
        assert_eq!(Period::Afternoon.key_suffix(), "AFTER");
        assert_eq!(Period::Afternoon.to_string(), "afternoon");
    }

    // ── Report ────────────────────────────────────────────────────────────────

    #[test]
    fn test_report_anchor_is_earliest_date() {
        let mut report = Report::new();
        report.push(date("2024-06-05"), Period::Morning, run("a"));
        report.push(date("2024-06-03"), Period::Afternoon, run("b"));
        assert_eq!(report.anchor_date(), Some(date("2024-06-03")));
        assert_eq!(report.len(), 2);
        assert_eq!(report.run_count(), 2);
    }

    #[test]
    fn test_report_empty_has_no_anchor() {
        let report = Report::new();
        assert!(report.is_empty());
        assert!(report.anchor_date().is_none());
    }

    #[test]
    fn test_report_push_keeps_encounter_order() {
        let mut report = Report::new();
        let d = date("2024-06-03");
        report.push(d, Period::Morning, run("first"));
        report.push(d, Period::Morning, run("second"));
        let times: Vec<&str> = report
            .day(d)
            .unwrap()
            .runs(Period::Morning)
            .iter()
            .map(|r| r.time.as_str())
            .collect();
        assert_eq!(times, vec!["first", "second"]);
    }

    // ── RenderContext ─────────────────────────────────────────────────────────

    #[test]
    fn test_expected_keys_shape() {
        let keys = RenderContext::expected_keys();
        assert_eq!(keys.len(), 50);
        assert!(keys.contains(&"DATE_MONDAY".to_string()));
        assert!(keys.contains(&"PACE_SUNDAY_AFTER".to_string()));
        assert_eq!(keys.last().map(String::as_str), Some("WEEKLY_DISTANCE"));
    }

    #[test]
    fn test_render_context_serialises_flat() {
        let mut map = BTreeMap::new();
        map.insert("WEEKLY_DISTANCE".to_string(), "8.0".to_string());
        let ctx = RenderContext::new(map);
        let json = serde_json::to_string(&ctx).unwrap();
        assert_eq!(json, r#"{"WEEKLY_DISTANCE":"8.0"}"#);
    }
}
