use std::path::PathBuf;
use thiserror::Error;

/// All errors produced while generating a training log.
#[derive(Error, Debug)]
pub enum LogError {
    /// The input file could not be opened or read.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output document could not be written.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The delimited input could not be tokenised.
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// Neither the primary nor the secondary column layout matched.
    #[error("Unrecognised column layout; missing required columns: {}", .missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    /// An activity date/time value did not match any recognised format.
    #[error("Invalid date/time value \"{value}\" on row {row}")]
    TimestampParse { value: String, row: usize },

    /// A calendar-day argument (such as the window end) could not be parsed.
    #[error("Invalid date: {0}")]
    DateParse(String),

    /// A distance value could not be converted to a number.
    #[error("Invalid distance \"{value}\" in {period} entry on {date}")]
    InvalidDistance {
        value: String,
        date: String,
        period: String,
    },

    /// The date window contains no activities, so no anchor date exists.
    #[error("No data found for the selected date range")]
    EmptyWindow,

    /// The document template is malformed or unreadable as an archive.
    #[error("Template error: {0}")]
    Template(String),

    /// A JSON document could not be produced or parsed.
    #[error("Failed to serialise JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LogError {
    /// Name of the pipeline stage the error belongs to.
    pub fn stage(&self) -> &'static str {
        match self {
            LogError::FileRead { .. }
            | LogError::CsvParse(_)
            | LogError::SchemaMismatch { .. }
            | LogError::TimestampParse { .. } => "load",
            LogError::InvalidDistance { .. } | LogError::EmptyWindow => "build",
            LogError::FileWrite { .. }
            | LogError::Template(_)
            | LogError::Json(_)
            | LogError::Io(_) => "render",
            LogError::DateParse(_) | LogError::Config(_) => "config",
        }
    }
}

/// Convenience alias used throughout the training-log crates.
pub type Result<T> = std::result::Result<T, LogError>;
