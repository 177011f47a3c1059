//! Shared types for the training-log workspace.
//!
//! Holds the activity and report models, the error type, date/time parsing,
//! display formatting and CLI settings used by the data, render and binary
//! crates.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{LogError, Result};
