//! `.docx` template rendering.
//!
//! A Word document is a ZIP archive of XML parts. Rendering copies every part
//! of the template into the output archive, substituting `{{ KEY }}`
//! placeholders in the body, header and footer parts.

use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use regex::{Captures, Regex};
use tracing::{debug, info, warn};
use trainlog_core::error::{LogError, Result};
use trainlog_core::models::RenderContext;
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::ContextRenderer;

/// Main document part; a template without it is rejected.
const DOCUMENT_PART: &str = "word/document.xml";

/// `{{ KEY }}`, allowing whitespace and Word run markup between the braces
/// and the key.
const PLACEHOLDER_PATTERN: &str = r"\{\{(?:\s|<[^>]*>)*([A-Za-z0-9_]+)(?:\s|<[^>]*>)*\}\}";

/// Result of substituting one XML part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    pub xml: String,
    /// Keys that were found and replaced.
    pub replaced: Vec<String>,
    /// Placeholders with no value in the context; rendered empty.
    pub unknown: Vec<String>,
}

/// Renders a [`RenderContext`] into a copy of a `.docx` template.
#[derive(Debug, Clone)]
pub struct DocxTemplateRenderer {
    template_path: PathBuf,
}

impl DocxTemplateRenderer {
    pub fn new(template_path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: template_path.into(),
        }
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }
}

impl ContextRenderer for DocxTemplateRenderer {
    fn render(&self, context: &RenderContext, output: &Path) -> Result<()> {
        // Read the whole template first; `output` may name the template itself.
        let template = std::fs::read(&self.template_path).map_err(|e| {
            LogError::Template(format!("cannot open {}: {e}", self.template_path.display()))
        })?;
        let mut archive = ZipArchive::new(Cursor::new(template)).map_err(template_error)?;
        if archive.by_name(DOCUMENT_PART).is_err() {
            return Err(LogError::Template(format!(
                "{} has no {}",
                self.template_path.display(),
                DOCUMENT_PART
            )));
        }

        let pattern = placeholder_regex()?;
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let mut replaced = Vec::new();

        for i in 0..archive.len() {
            let mut part = archive.by_index(i).map_err(template_error)?;
            let name = part.name().to_string();
            let options = FileOptions::default().compression_method(part.compression());

            if part.is_dir() {
                zip.add_directory(name, options).map_err(template_error)?;
                continue;
            }

            let mut data = Vec::new();
            part.read_to_end(&mut data)?;

            if is_substitutable(&name) {
                let xml = String::from_utf8(data)
                    .map_err(|e| LogError::Template(format!("{name} is not UTF-8: {e}")))?;
                let sub = substitute_placeholders(&pattern, &xml, context);
                for key in &sub.unknown {
                    warn!("Placeholder {} in {} has no value; rendered empty", key, name);
                }
                debug!("Replaced {} placeholders in {}", sub.replaced.len(), name);
                replaced.extend(sub.replaced);
                data = sub.xml.into_bytes();
            }

            zip.start_file(name, options).map_err(template_error)?;
            zip.write_all(&data)?;
        }

        let document = zip.finish().map_err(template_error)?.into_inner();
        write_atomic(output, &document)?;

        let untouched: Vec<&String> = context
            .iter()
            .map(|(k, _)| k)
            .filter(|k| !replaced.contains(*k))
            .collect();
        if !untouched.is_empty() {
            debug!("Template has no placeholder for {} keys: {:?}", untouched.len(), untouched);
        }

        info!("Report written to {}", output.display());
        Ok(())
    }
}

/// Compile the placeholder pattern.
pub fn placeholder_regex() -> Result<Regex> {
    Regex::new(PLACEHOLDER_PATTERN).map_err(|e| LogError::Template(e.to_string()))
}

/// Replace every placeholder in `xml` with its XML-escaped context value.
pub fn substitute_placeholders(pattern: &Regex, xml: &str, context: &RenderContext) -> Substitution {
    let mut replaced = Vec::new();
    let mut unknown = Vec::new();

    let rendered = pattern.replace_all(xml, |caps: &Captures| {
        let key = &caps[1];
        match context.get(key) {
            Some(value) => {
                replaced.push(key.to_string());
                escape_xml(value)
            }
            None => {
                unknown.push(key.to_string());
                String::new()
            }
        }
    });

    Substitution {
        xml: rendered.into_owned(),
        replaced,
        unknown,
    }
}

fn is_substitutable(part: &str) -> bool {
    part == DOCUMENT_PART
        || ((part.starts_with("word/header") || part.starts_with("word/footer"))
            && part.ends_with(".xml"))
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Write `bytes` to a sibling temp file and rename it onto `path`. A failed
/// write leaves no partial document at `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let write_err = |source| LogError::FileWrite {
        path: path.to_path_buf(),
        source,
    };
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    std::fs::write(&tmp, bytes).map_err(write_err)?;
    if let Err(source) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(write_err(source));
    }
    Ok(())
}

fn template_error(e: ZipError) -> LogError {
    LogError::Template(e.to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
