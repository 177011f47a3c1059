//! Activity export loading for the training log.
//!
//! Reads a delimited export, resolves its column layout, derives the calendar
//! date and period of every row, and keeps the rows that fall inside the
//! requested [`DateWindow`].

use std::io::Read;
use std::path::Path;

use trainlog_core::error::{LogError, Result};
use trainlog_core::models::{ActivityRecord, NormalizedRecord, Period};
use trainlog_core::time_utils::{parse_activity_timestamp, DateWindow};
use tracing::{debug, info};

use crate::schema::{detect_schema, ColumnSchema};

// ── Public types ──────────────────────────────────────────────────────────────

/// Rows read from one export, before window filtering.
#[derive(Debug, Clone)]
pub struct RawActivities {
    /// `"primary"` or `"secondary"`.
    pub schema: &'static str,
    /// Each record paired with its line number in the source.
    pub rows: Vec<(usize, ActivityRecord)>,
}

/// Normalized rows that survived the window filter.
#[derive(Debug, Clone)]
pub struct LoadedActivities {
    pub schema: &'static str,
    /// Number of data rows in the export.
    pub total_rows: usize,
    /// In-window records, in input order.
    pub records: Vec<NormalizedRecord>,
}

/// Loads and normalizes activity exports for one report window.
#[derive(Debug, Clone, Copy)]
pub struct ActivityLoader {
    window: DateWindow,
}

impl ActivityLoader {
    pub fn new(window: DateWindow) -> Self {
        Self { window }
    }

    pub fn window(&self) -> DateWindow {
        self.window
    }

    /// Load the export at `path`.
    pub fn load_file(&self, path: &Path) -> Result<LoadedActivities> {
        let file = std::fs::File::open(path).map_err(|source| LogError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Reading activities from {}", path.display());
        self.load_reader(file)
    }

    /// Load an export from any reader.
    ///
    /// Every row's date/time is parsed before filtering, so a malformed value
    /// anywhere in the export fails the load.
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<LoadedActivities> {
        let raw = read_activities(reader)?;
        let total_rows = raw.rows.len();

        let mut records = Vec::with_capacity(total_rows);
        for (line, record) in &raw.rows {
            let normalized = normalize_record(record, *line)?;
            if self.window.contains(normalized.date) {
                records.push(normalized);
            }
        }

        info!(
            "Loaded {} of {} activities between {} and {} ({} columns)",
            records.len(),
            total_rows,
            self.window.start(),
            self.window.end(),
            raw.schema,
        );

        Ok(LoadedActivities {
            schema: raw.schema,
            total_rows,
            records,
        })
    }
}

// ── Free functions ────────────────────────────────────────────────────────────

/// Read every data row of an export, projecting it through the detected
/// column layout.
pub fn read_activities<R: Read>(reader: R) -> Result<RawActivities> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let schema = detect_schema(&headers);
    let columns = match &schema {
        ColumnSchema::Primary(map) | ColumnSchema::Secondary(map) => *map,
        ColumnSchema::Unrecognized { missing } => {
            return Err(LogError::SchemaMismatch {
                missing: missing.clone(),
            })
        }
    };
    debug!("Detected {} column layout: {:?}", schema.label(), columns);

    let mut rows = Vec::new();
    for (idx, result) in csv_reader.records().enumerate() {
        let row = result?;
        // Header is line 1.
        let line = row
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);
        rows.push((line, columns.project(&row)));
    }

    Ok(RawActivities {
        schema: schema.label(),
        rows,
    })
}

/// Derive the calendar date, clock time and period of one record.
///
/// `line` is only used to locate the offending row in the error.
pub fn normalize_record(record: &ActivityRecord, line: usize) -> Result<NormalizedRecord> {
    let timestamp =
        parse_activity_timestamp(&record.date_time).ok_or_else(|| LogError::TimestampParse {
            value: record.date_time.clone(),
            row: line,
        })?;

    let time_of_day = timestamp.time();
    Ok(NormalizedRecord {
        date: timestamp.date(),
        time_of_day,
        period: Period::from_time(time_of_day),
        time: record.time.clone(),
        distance: record.distance.clone(),
        pace: record.pace.clone(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
