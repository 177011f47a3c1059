//! Grouping of normalized activities into a [`Report`].

use trainlog_core::models::{NormalizedRecord, Period, Report};
use tracing::debug;

/// Per-period run counts, mainly for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodCounts {
    pub morning: usize,
    pub afternoon: usize,
}

/// Stateless helper that groups records by calendar day and period.
pub struct ReportAggregator;

impl ReportAggregator {
    /// Group `records` by `(date, period)`.
    ///
    /// Within a group, runs keep the order in which they were encountered.
    /// Days iterate in ascending order; morning precedes afternoon.
    pub fn aggregate(records: &[NormalizedRecord]) -> Report {
        let mut report = Report::new();
        for record in records {
            report.push(record.date, record.period, record.to_run_entry());
        }

        debug!(
            "Aggregated {} runs into {} days",
            report.run_count(),
            report.len()
        );
        report
    }

    /// Count the runs in each period across the whole report.
    pub fn period_counts(report: &Report) -> PeriodCounts {
        let mut counts = PeriodCounts::default();
        for (_, day) in report.iter() {
            counts.morning += day.runs(Period::Morning).len();
            counts.afternoon += day.runs(Period::Afternoon).len();
        }
        counts
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
