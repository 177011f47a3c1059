//! Output renderers for the training log.
//!
//! A renderer turns a [`RenderContext`] into a file: the weekly `.docx`
//! document, or a JSON dump of the placeholder values.

use std::path::Path;

use trainlog_core::error::Result;
use trainlog_core::models::RenderContext;

pub mod docx;
pub mod json;

pub use docx::DocxTemplateRenderer;
pub use json::JsonContextRenderer;

/// Writes a render context to `output`.
pub trait ContextRenderer {
    fn render(&self, context: &RenderContext, output: &Path) -> Result<()>;
}
