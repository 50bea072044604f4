//! Health risk factors vs healthcare costs.
//!
//! Loads per-country alcohol, sugar and tobacco consumption alongside
//! healthcare spending, drops incomplete rows, prints descriptive and grouped
//! statistics, and renders bar and scatter charts of each risk factor against
//! per-person cost and cost as a share of GDP.

mod config;
mod eda;
mod eda_statistics;
mod error;
mod load_clean;
mod models;
mod report;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::AnalysisConfig;

fn main() -> Result<()> {
    init_logging();

    let config = AnalysisConfig::default();
    run(&config)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run(config: &AnalysisConfig) -> Result<()> {
    // Step 1: Load
    let raw = load_clean::load_dataset(&config.input_path)
        .with_context(|| format!("Could not load {}", config.input_path.display()))?;
    report::print_overview("Raw data", &raw, config.preview_rows);

    // Step 2: Clean
    let clean = raw.dropna();
    report::print_overview("Cleaned data", &clean, config.preview_rows);

    // Step 3: Summarize
    let observations = clean.observations();
    let summary = eda_statistics::summarize(&observations, config);
    report::print_summary(&summary);

    // Step 4: Visualize
    let charts = eda::render_all(&summary, &observations, config).context("Could not render charts")?;
    for chart in &charts {
        println!("Chart saved to {}", chart.display());
    }

    info!(
        rows = raw.len(),
        complete = observations.len(),
        charts = charts.len(),
        "Analysis finished"
    );
    Ok(())
}
