//! Column-layout detection for activity exports.
//!
//! Exports come with English headers or with the Portuguese locale's headers.
//! The layout is decided once from the header row; rows are then projected
//! through the resulting [`ColumnMap`].

use csv::StringRecord;

use trainlog_core::models::ActivityRecord;

/// English headers: date-time, distance, elapsed time, average pace.
pub const PRIMARY_COLUMNS: [&str; 4] = ["Date", "Distance", "Time", "Avg Pace"];

const SECONDARY_DATE: &str = "Data";
const SECONDARY_DISTANCE: &str = "Distância";
const SECONDARY_TIME: &str = "Tempo";
/// Pace header candidates, in order of preference.
const SECONDARY_PACE: [&str; 2] = ["Ritmo médio", "Velocidade média"];

/// Positions of the required columns within a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: usize,
    pub distance: usize,
    pub time: usize,
    pub pace: usize,
}

impl ColumnMap {
    /// Project a CSV row onto an [`ActivityRecord`]. Missing trailing cells
    /// read as empty strings.
    pub fn project(&self, row: &StringRecord) -> ActivityRecord {
        let cell = |idx: usize| row.get(idx).unwrap_or_default().trim().to_string();
        ActivityRecord {
            date_time: cell(self.date),
            time: cell(self.time),
            distance: cell(self.distance),
            pace: cell(self.pace),
        }
    }
}

/// Outcome of header inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSchema {
    /// English column names.
    Primary(ColumnMap),
    /// Portuguese column names.
    Secondary(ColumnMap),
    /// Neither layout matched; `missing` lists the absent columns of the
    /// layout that came closest.
    Unrecognized { missing: Vec<String> },
}

impl ColumnSchema {
    pub fn columns(&self) -> Option<ColumnMap> {
        match self {
            ColumnSchema::Primary(map) | ColumnSchema::Secondary(map) => Some(*map),
            ColumnSchema::Unrecognized { .. } => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ColumnSchema::Primary(_) => "primary",
            ColumnSchema::Secondary(_) => "secondary",
            ColumnSchema::Unrecognized { .. } => "unrecognized",
        }
    }
}

/// Decide which column layout `headers` follows.
pub fn detect_schema(headers: &StringRecord) -> ColumnSchema {
    let names: Vec<&str> = headers.iter().map(normalize_header).collect();
    let find = |name: &str| names.iter().position(|h| *h == name);

    if let (Some(date), Some(distance), Some(time), Some(pace)) = (
        find(PRIMARY_COLUMNS[0]),
        find(PRIMARY_COLUMNS[1]),
        find(PRIMARY_COLUMNS[2]),
        find(PRIMARY_COLUMNS[3]),
    ) {
        return ColumnSchema::Primary(ColumnMap {
            date,
            distance,
            time,
            pace,
        });
    }

    let pace = SECONDARY_PACE.iter().find_map(|&name| find(name));
    if let (Some(date), Some(distance), Some(time), Some(pace)) = (
        find(SECONDARY_DATE),
        find(SECONDARY_DISTANCE),
        find(SECONDARY_TIME),
        pace,
    ) {
        return ColumnSchema::Secondary(ColumnMap {
            date,
            distance,
            time,
            pace,
        });
    }

    let absent = |cols: &[&str]| -> Vec<String> {
        cols.iter()
            .filter(|&&name| find(name).is_none())
            .map(|name| name.to_string())
            .collect()
    };
    let primary_missing = absent(&PRIMARY_COLUMNS);
    let mut secondary_missing = absent(&[SECONDARY_DATE, SECONDARY_DISTANCE, SECONDARY_TIME]);
    if pace.is_none() {
        secondary_missing.push(SECONDARY_PACE[0].to_string());
    }

    // Ties go to the primary layout.
    let missing = if secondary_missing.len() < primary_missing.len() {
        secondary_missing
    } else {
        primary_missing
    };
    ColumnSchema::Unrecognized { missing }
}

/// Strip surrounding whitespace and a UTF-8 byte-order mark.
fn normalize_header(h: &str) -> &str {
    h.trim_start_matches('\u{feff}').trim()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cols: &[&str]) -> StringRecord {
        StringRecord::from(cols.to_vec())
    }

    #[test]
    fn test_detect_primary() {
        let schema = detect_schema(&headers(&[
            "Activity Type",
            "Date",
            "Title",
            "Distance",
            "Time",
            "Avg Pace",
        ]));
        assert_eq!(
            schema,
            ColumnSchema::Primary(ColumnMap {
                date: 1,
                distance: 3,
                time: 4,
                pace: 5,
            })
        );
        assert_eq!(schema.label(), "primary");
    }

    #[test]
    fn test_detect_secondary_ritmo() {
        let schema = detect_schema(&headers(&["Data", "Distância", "Tempo", "Ritmo médio"]));
        assert_eq!(
            schema,
            ColumnSchema::Secondary(ColumnMap {
                date: 0,
                distance: 1,
                time: 2,
                pace: 3,
            })
        );
    }

    #[test]
    fn test_detect_secondary_velocidade() {
        let schema = detect_schema(&headers(&["Tempo", "Data", "Velocidade média", "Distância"]));
        assert_eq!(
            schema.columns(),
            Some(ColumnMap {
                date: 1,
                distance: 3,
                time: 0,
                pace: 2,
            })
        );
    }

    #[test]
    fn test_detect_secondary_prefers_ritmo() {
        let schema = detect_schema(&headers(&[
            "Data",
            "Distância",
            "Tempo",
            "Velocidade média",
            "Ritmo médio",
        ]));
        assert_eq!(schema.columns().map(|m| m.pace), Some(4));
    }

    #[test]
    fn test_detect_primary_wins_when_both_present() {
        let schema = detect_schema(&headers(&[
            "Data", "Distância", "Tempo", "Ritmo médio", "Date", "Distance", "Time", "Avg Pace",
        ]));
        assert_eq!(schema.label(), "primary");
    }

    #[test]
    fn test_detect_strips_bom_and_whitespace() {
        let schema = detect_schema(&headers(&["\u{feff}Date", " Distance ", "Time", "Avg Pace"]));
        assert_eq!(schema.label(), "primary");
    }

    #[test]
    fn test_detect_unrecognized_lists_missing_primary_columns() {
        let schema = detect_schema(&headers(&["Date", "Distance", "Calories"]));
        assert_eq!(
            schema,
            ColumnSchema::Unrecognized {
                missing: vec!["Time".to_string(), "Avg Pace".to_string()],
            }
        );
        assert!(schema.columns().is_none());
    }

    #[test]
    fn test_detect_unrecognized_reports_closest_layout() {
        let schema = detect_schema(&headers(&["Data", "Distância", "Tempo", "Calorias"]));
        assert_eq!(
            schema,
            ColumnSchema::Unrecognized {
                missing: vec!["Ritmo médio".to_string()],
            }
        );
    }

    #[test]
    fn test_detect_unrecognized_tie_reports_primary() {
        let schema = detect_schema(&headers(&["Start", "Km"]));
        assert_eq!(
            schema,
            ColumnSchema::Unrecognized {
                missing: PRIMARY_COLUMNS.iter().map(|c| c.to_string()).collect(),
            }
        );
    }

    #[test]
    fn test_project_short_row_reads_empty() {
        let map = ColumnMap {
            date: 0,
            distance: 1,
            time: 2,
            pace: 3,
        };
        let row = StringRecord::from(vec!["2024-06-03 07:00:00", " 5.0 "]);
        let record = map.project(&row);
        assert_eq!(record.date_time, "2024-06-03 07:00:00");
        assert_eq!(record.distance, "5.0");
        assert_eq!(record.time, "");
        assert_eq!(record.pace, "");
    }
}
