use anyhow::{Context, Result};
use clap::Parser;
use pattern_energy::{
    source, Cli, Config, CsvReporter, JsonReporter, Pipeline, Reporter, TerminalReporter,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr; the report itself goes to stdout.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Load config and apply CLI overrides
    let mut config = Config::load_from(cli.config.as_deref())?;
    cli.apply_to_config(&mut config);
    debug!(?config, "Configuration");

    let pipeline = Pipeline::from_config(&config)?;
    let records = source::from_config(&config.records);

    let report = pipeline
        .run(records.as_ref())
        .context("Failed to analyze benchmarks")?;

    CsvReporter::new(&config.output.merged_path)
        .report(&report)
        .with_context(|| {
            format!(
                "Failed to write merged dataset to {}",
                config.output.merged_path.display()
            )
        })?;
    info!(path = %config.output.merged_path.display(), "Saved merged dataset");

    if let Some(json_path) = &config.output.json_path {
        JsonReporter::new(json_path)
            .report(&report)
            .with_context(|| format!("Failed to write JSON report to {}", json_path.display()))?;
        info!(path = %json_path.display(), "Saved JSON report");
    }

    let terminal = if cli.no_color {
        TerminalReporter::without_colors()
    } else {
        TerminalReporter::new()
    };
    terminal.report(&report)?;

    Ok(())
}
