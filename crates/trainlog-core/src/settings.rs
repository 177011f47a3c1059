use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::time_utils::{last_sunday, parse_day, DateWindow};

/// Name used when none was given and none was remembered.
pub const DEFAULT_NAME: &str = "Athlete";

/// File-name prefix of generated documents.
pub const OUTPUT_PREFIX: &str = "Registo_Treino";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Generate a weekly training-log document from an activity export
#[derive(Parser, Debug, Clone)]
#[command(
    name = "training-log",
    about = "Generate a weekly training-log document from an activity export",
    version
)]
pub struct Settings {
    /// Activity export to read (CSV)
    pub input: PathBuf,

    /// Name shown in the output file name
    #[arg(long, default_value = DEFAULT_NAME)]
    pub name: String,

    /// Last day of the report window (defaults to the most recent Sunday)
    #[arg(long, value_parser = parse_day_arg)]
    pub end_date: Option<NaiveDate>,

    /// Number of days before the end date to include
    #[arg(long, default_value = "6", value_parser = clap::value_parser!(u32).range(0..=366))]
    pub days: u32,

    /// Document template containing `{{ KEY }}` placeholders
    #[arg(long, default_value = "data/log_template.docx")]
    pub template: PathBuf,

    /// Output document path (defaults to "Registo_Treino <name>.docx")
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Print the render context as JSON instead of writing a document
    #[arg(long)]
    pub print_context: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

fn parse_day_arg(s: &str) -> Result<NaiveDate, String> {
    parse_day(s).map_err(|e| e.to_string())
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.training-log/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".training-log").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, resolve the default end date, and persist the
    /// result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
            chrono::Local::now().date_naive(),
        )
    }

    /// Full implementation; accepts args, an explicit config path and the
    /// current date so tests can pin all three.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &Path,
        today: NaiveDate,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::resolve_defaults(settings, today);
        }

        let last = LastUsedParams::load_from(config_path);

        if !is_arg_explicitly_set(&matches, "name") {
            if let Some(v) = last.name {
                settings.name = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "template") {
            if let Some(v) = last.template {
                settings.template = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "days") {
            if let Some(v) = last.days {
                settings.days = v;
            }
        }

        settings = Self::resolve_defaults(settings, today);

        let params = LastUsedParams::from(&settings);
        let _ = params.save_to(config_path);

        settings
    }

    /// Fill the end date and apply the `--debug` flag.
    fn resolve_defaults(mut settings: Settings, today: NaiveDate) -> Settings {
        if settings.end_date.is_none() {
            settings.end_date = Some(last_sunday(today));
        }
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// The report window described by these settings.
    ///
    /// Falls back to the most recent Sunday before `today` when no end date
    /// has been resolved.
    pub fn window(&self, today: NaiveDate) -> DateWindow {
        let end = self.end_date.unwrap_or_else(|| last_sunday(today));
        DateWindow::new(end, self.days)
    }

    /// Where the generated document is written.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{} {}.docx", OUTPUT_PREFIX, self.name)))
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            name: Some(s.name.clone()),
            template: Some(s.template.clone()),
            days: Some(s.days),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
