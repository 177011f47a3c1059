//! End-to-end report generation.
//!
//! Runs loader → aggregator → context builder and returns the render context
//! together with the intermediate report and some run metadata.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use trainlog_core::error::Result;
use trainlog_core::models::{RenderContext, Report};
use trainlog_core::time_utils::DateWindow;
use tracing::info;

use crate::aggregator::ReportAggregator;
use crate::context::build_context;
use crate::loader::{ActivityLoader, LoadedActivities};

// ── Public types ──────────────────────────────────────────────────────────────

/// Facts about one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportMetadata {
    /// Column layout detected in the export.
    pub schema: &'static str,
    /// First and last day of the filter window.
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    /// Data rows in the export.
    pub rows_read: usize,
    /// Rows inside the window.
    pub rows_in_window: usize,
    /// First rendered day.
    pub anchor_date: NaiveDate,
    /// Wall-clock seconds spent reading and normalizing.
    pub load_time_seconds: f64,
}

/// The complete output of [`generate_report`].
#[derive(Debug, Clone)]
pub struct ReportOutput {
    pub context: RenderContext,
    pub report: Report,
    pub metadata: ReportMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Generate the render context for the export at `input`.
pub fn generate_report(input: &Path, window: DateWindow) -> Result<ReportOutput> {
    let load_start = std::time::Instant::now();
    let loaded = ActivityLoader::new(window).load_file(input)?;
    finish(loaded, window, load_start.elapsed().as_secs_f64())
}

/// Generate the render context for an export held in any reader.
pub fn generate_report_from_reader<R: Read>(reader: R, window: DateWindow) -> Result<ReportOutput> {
    let load_start = std::time::Instant::now();
    let loaded = ActivityLoader::new(window).load_reader(reader)?;
    finish(loaded, window, load_start.elapsed().as_secs_f64())
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn finish(loaded: LoadedActivities, window: DateWindow, load_time: f64) -> Result<ReportOutput> {
    let report = ReportAggregator::aggregate(&loaded.records);
    let context = build_context(&report)?;

    // build_context has already rejected an empty report.
    let anchor_date = report.anchor_date().unwrap_or_else(|| window.start());
    if anchor_date != window.start() {
        info!(
            "First run in window is on {}; rendered week starts there instead of {}",
            anchor_date,
            window.start()
        );
    }

    let counts = ReportAggregator::period_counts(&report);
    info!(
        "Report covers {} days ({} morning, {} afternoon runs)",
        report.len(),
        counts.morning,
        counts.afternoon
    );

    Ok(ReportOutput {
        context,
        metadata: ReportMetadata {
            schema: loaded.schema,
            window_start: window.start(),
            window_end: window.end(),
            rows_read: loaded.total_rows,
            rows_in_window: loaded.records.len(),
            anchor_date,
            load_time_seconds: load_time,
        },
        report,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
