mod bootstrap;

use std::process::ExitCode;

use anyhow::{Context, Result};
use trainlog_core::error::LogError;
use trainlog_core::settings::Settings;
use trainlog_data::pipeline::generate_report;
use trainlog_render::{ContextRenderer, DocxTemplateRenderer, JsonContextRenderer};

fn main() -> ExitCode {
    let settings = Settings::load_with_last_used();

    let setup = bootstrap::ensure_directories()
        .and_then(|_| bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref()));
    if let Err(err) = setup {
        eprintln!("[config] {err:#}");
        return ExitCode::FAILURE;
    }

    match run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let stage = err
                .downcast_ref::<LogError>()
                .map(LogError::stage)
                .unwrap_or("run");
            tracing::error!("[{}] {:#}", stage, err);
            ExitCode::FAILURE
        }
    }
}

fn run(settings: &Settings) -> Result<()> {
    tracing::info!("Training log v{} starting", env!("CARGO_PKG_VERSION"));

    let window = settings.window(chrono::Local::now().date_naive());
    tracing::info!(
        "Athlete: {}, window: {} to {}",
        settings.name,
        window.start(),
        window.end()
    );

    let output = generate_report(&settings.input, window)
        .with_context(|| format!("generating report from {}", settings.input.display()))?;
    tracing::debug!("{:?}", output.metadata);

    if settings.print_context {
        let stdout = std::io::stdout();
        JsonContextRenderer::new().write_to(&output.context, stdout.lock())?;
        return Ok(());
    }

    let target = settings.output_path();
    DocxTemplateRenderer::new(&settings.template)
        .render(&output.context, &target)
        .with_context(|| format!("rendering {}", settings.template.display()))?;

    println!("{}", target.display());
    Ok(())
}
