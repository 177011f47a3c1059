//! Data pipeline for the training log.
//!
//! Responsible for reading activity exports, detecting their column layout,
//! normalizing and filtering rows to the report window, grouping them into a
//! [`Report`](trainlog_core::models::Report) and flattening that into the
//! placeholder map consumed by document renderers.

pub mod aggregator;
pub mod context;
pub mod loader;
pub mod pipeline;
pub mod schema;

pub use trainlog_core as core;
