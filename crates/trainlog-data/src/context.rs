//! Flattening of a [`Report`] into the placeholder map used by templates.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use trainlog_core::error::{LogError, Result};
use trainlog_core::formatting::{format_distance, join_cell, parse_distance, round_to};
use trainlog_core::models::{
    Period, RenderContext, Report, RunEntry, DAY_LABELS, WEEKLY_DISTANCE_KEY,
};
use tracing::debug;

/// The three display strings of one report cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeriodCell {
    pub time: String,
    pub distance: String,
    pub pace: String,
}

/// Build the render context for the seven days starting at the report's
/// anchor date.
///
/// The anchor is the earliest date present in `report`, not the start of
/// the loader's window: when the first days of the window have no runs, the
/// rendered week begins on the first day that does. Labels are positional, so
/// the anchor is always rendered as `MONDAY`.
///
/// Fails with [`LogError::EmptyWindow`] for an empty report and with
/// [`LogError::InvalidDistance`] when a visited distance is not numeric.
pub fn build_context(report: &Report) -> Result<RenderContext> {
    let anchor = report.anchor_date().ok_or(LogError::EmptyWindow)?;

    let mut values = BTreeMap::new();
    let mut total_distance = 0.0;

    for (offset, label) in DAY_LABELS.iter().enumerate() {
        let date = anchor
            .checked_add_days(Days::new(offset as u64))
            .ok_or_else(|| LogError::DateParse(format!("{anchor} + {offset} days")))?;
        let date_str = date.format("%Y-%m-%d").to_string();
        let day = report.day(date);

        let mut day_distance = 0.0;
        let mut cells = Vec::with_capacity(Period::ALL.len());
        for period in Period::ALL {
            let runs = day.map(|d| d.runs(period)).unwrap_or_default();
            let ordered = chronological(runs);
            let mut distances = Vec::with_capacity(ordered.len());
            for run in &ordered {
                let distance = run_distance(run, date, period)?;
                day_distance += distance;
                distances.push(format_distance(distance));
            }
            let cell = PeriodCell {
                time: join_cell(ordered.iter().map(|r| r.time.as_str())),
                distance: join_cell(&distances),
                pace: join_cell(ordered.iter().map(|r| r.pace.as_str())),
            };

            let suffix = period.key_suffix();
            values.insert(format!("TIME_{label}_{suffix}"), cell.time.clone());
            values.insert(format!("DIST_{label}_{suffix}"), cell.distance.clone());
            values.insert(format!("PACE_{label}_{suffix}"), cell.pace.clone());
            cells.push(cell);
        }

        debug!(
            "{}: Date: {}, Morning: {}, {}, {}, Afternoon: {}, {}, {}",
            label,
            date_str,
            cells[0].time,
            cells[0].distance,
            cells[0].pace,
            cells[1].time,
            cells[1].distance,
            cells[1].pace,
        );

        values.insert(format!("DATE_{label}"), date_str);
        total_distance += day_distance;
    }

    let weekly = format_distance(round_to(total_distance, 2));
    debug!("Weekly distance: {}", weekly);
    values.insert(WEEKLY_DISTANCE_KEY.to_string(), weekly);

    Ok(RenderContext::new(values))
}

/// Display order of a period's runs.
///
/// Multi-leg workouts (warm-up, main set, cool-down) are exported newest
/// first, so a period holding more than one run is reversed as a whole. A
/// single run is returned unchanged. This assumes the export lists every
/// same-period run strictly newest first.
pub fn chronological(runs: &[RunEntry]) -> Vec<&RunEntry> {
    if runs.len() > 1 {
        runs.iter().rev().collect()
    } else {
        runs.iter().collect()
    }
}

fn run_distance(run: &RunEntry, date: NaiveDate, period: Period) -> Result<f64> {
    parse_distance(&run.distance).ok_or_else(|| LogError::InvalidDistance {
        value: run.distance.clone(),
        date: date.format("%Y-%m-%d").to_string(),
        period: period.to_string(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn run(time: &str, distance: &str, pace: &str) -> RunEntry {
        RunEntry {
            time: time.to_string(),
            distance: distance.to_string(),
            pace: pace.to_string(),
        }
    }

    fn key<'a>(ctx: &'a RenderContext, k: &str) -> &'a str {
        ctx.get(k).unwrap_or_else(|| panic!("missing key {k}"))
    }

    // ── build_context ─────────────────────────────────────────────────────────

    #[test]
    fn test_two_morning_runs_render_reversed() {
        let mut report = Report::new();
        let d = date("2024-06-03");
        report.push(d, Period::Morning, run("25:00", "5.0", "5:00"));
        report.push(d, Period::Morning, run("15:00", "3.0", "5:00"));

        let ctx = build_context(&report).unwrap();
        assert_eq!(key(&ctx, "DATE_MONDAY"), "2024-06-03");
        assert_eq!(key(&ctx, "TIME_MONDAY_MORN"), "15:00, 25:00");
        assert_eq!(key(&ctx, "DIST_MONDAY_MORN"), "3.0, 5.0");
        assert_eq!(key(&ctx, "PACE_MONDAY_MORN"), "5:00, 5:00");
        assert_eq!(key(&ctx, "TIME_MONDAY_AFTER"), "");
        assert_eq!(key(&ctx, "WEEKLY_DISTANCE"), "8.0");
    }

    #[test]
    fn test_three_runs_fully_reversed() {
        let mut report = Report::new();
        let d = date("2024-06-04");
        report.push(d, Period::Afternoon, run("a", "1.0", "p1"));
        report.push(d, Period::Afternoon, run("b", "2.0", "p2"));
        report.push(d, Period::Afternoon, run("c", "3.0", "p3"));

        let ctx = build_context(&report).unwrap();
        assert_eq!(key(&ctx, "TIME_MONDAY_AFTER"), "c, b, a");
        assert_eq!(key(&ctx, "PACE_MONDAY_AFTER"), "p3, p2, p1");
    }

    #[test]
    fn test_single_run_unchanged() {
        let mut report = Report::new();
        report.push(date("2024-06-03"), Period::Afternoon, run("45:10", "9.12", "4:57"));

        let ctx = build_context(&report).unwrap();
        assert_eq!(key(&ctx, "TIME_MONDAY_AFTER"), "45:10");
        assert_eq!(key(&ctx, "DIST_MONDAY_AFTER"), "9.12");
        assert_eq!(key(&ctx, "WEEKLY_DISTANCE"), "9.12");
    }

    #[test]
    fn test_context_has_exactly_the_expected_keys() {
        let mut report = Report::new();
        report.push(date("2024-06-03"), Period::Morning, run("t", "1.0", "p"));

        let ctx = build_context(&report).unwrap();
        let mut expected = RenderContext::expected_keys();
        expected.sort();
        let actual: Vec<String> = ctx.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_anchor_is_earliest_report_date() {
        // Window would start on 2024-06-03, but the first run is on Wednesday.
        let mut report = Report::new();
        report.push(date("2024-06-07"), Period::Morning, run("t2", "2.0", "p"));
        report.push(date("2024-06-05"), Period::Morning, run("t1", "1.0", "p"));

        let ctx = build_context(&report).unwrap();
        assert_eq!(key(&ctx, "DATE_MONDAY"), "2024-06-05");
        assert_eq!(key(&ctx, "TIME_MONDAY_MORN"), "t1");
        assert_eq!(key(&ctx, "DATE_WEDNESDAY"), "2024-06-07");
        assert_eq!(key(&ctx, "TIME_WEDNESDAY_MORN"), "t2");
        assert_eq!(key(&ctx, "DATE_SUNDAY"), "2024-06-11");
    }

    #[test]
    fn test_runs_beyond_seventh_day_are_not_rendered() {
        let mut report = Report::new();
        report.push(date("2024-06-01"), Period::Morning, run("a", "1.0", "p"));
        report.push(date("2024-06-08"), Period::Morning, run("b", "50.0", "p"));

        let ctx = build_context(&report).unwrap();
        assert_eq!(key(&ctx, "DATE_SUNDAY"), "2024-06-07");
        assert_eq!(key(&ctx, "WEEKLY_DISTANCE"), "1.0");
    }

    #[test]
    fn test_weekly_distance_rounded_to_two_places() {
        let mut report = Report::new();
        report.push(date("2024-06-03"), Period::Morning, run("a", "5.123", "p"));
        report.push(date("2024-06-04"), Period::Afternoon, run("b", "3.456", "p"));
        report.push(date("2024-06-09"), Period::Morning, run("c", "0.1", "p"));

        let ctx = build_context(&report).unwrap();
        assert_eq!(key(&ctx, "WEEKLY_DISTANCE"), "8.68");
        assert_eq!(key(&ctx, "DIST_SUNDAY_MORN"), "0.1");
    }

    #[test]
    fn test_weekly_distance_tie_rounds_to_even() {
        let mut report = Report::new();
        report.push(date("2024-06-03"), Period::Morning, run("a", "10.125", "p"));
        report.push(date("2024-06-04"), Period::Morning, run("b", "0.0", "p"));

        let ctx = build_context(&report).unwrap();
        assert_eq!(key(&ctx, "DIST_MONDAY_MORN"), "10.125");
        assert_eq!(key(&ctx, "WEEKLY_DISTANCE"), "10.12");
    }

    #[test]
    fn test_whole_distances_keep_one_decimal() {
        let mut report = Report::new();
        report.push(date("2024-06-03"), Period::Morning, run("a", "10", "p"));

        let ctx = build_context(&report).unwrap();
        assert_eq!(key(&ctx, "DIST_MONDAY_MORN"), "10.0");
        assert_eq!(key(&ctx, "WEEKLY_DISTANCE"), "10.0");
    }

    #[test]
    fn test_empty_report_fails() {
        let err = build_context(&Report::new()).unwrap_err();
        assert!(matches!(err, LogError::EmptyWindow));
    }

    #[test]
    fn test_non_numeric_distance_names_entry() {
        let mut report = Report::new();
        report.push(date("2024-06-04"), Period::Afternoon, run("a", "--", "p"));

        let err = build_context(&report).unwrap_err();
        match err {
            LogError::InvalidDistance {
                value,
                date,
                period,
            } => {
                assert_eq!(value, "--");
                assert_eq!(date, "2024-06-04");
                assert_eq!(period, "afternoon");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_build_is_idempotent() {
        let mut report = Report::new();
        report.push(date("2024-06-03"), Period::Morning, run("a", "5.0", "p"));
        report.push(date("2024-06-05"), Period::Afternoon, run("b", "7.25", "q"));

        assert_eq!(build_context(&report).unwrap(), build_context(&report).unwrap());
    }

    // ── chronological ─────────────────────────────────────────────────────────

    #[test]
    fn test_chronological_empty() {
        assert!(chronological(&[]).is_empty());
    }
}
