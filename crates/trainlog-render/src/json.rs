//! JSON dump of a render context.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;
use trainlog_core::error::{LogError, Result};
use trainlog_core::models::RenderContext;

use crate::ContextRenderer;

/// Writes the context as a flat, key-sorted JSON object.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonContextRenderer;

impl JsonContextRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Write the context to any writer, followed by a newline.
    pub fn write_to<W: Write>(&self, context: &RenderContext, mut writer: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut writer, context)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

impl ContextRenderer for JsonContextRenderer {
    fn render(&self, context: &RenderContext, output: &Path) -> Result<()> {
        let file = File::create(output).map_err(|source| LogError::FileWrite {
            path: output.to_path_buf(),
            source,
        })?;
        self.write_to(context, BufWriter::new(file))?;
        info!("Context written to {}", output.display());
        Ok(())
    }
}
