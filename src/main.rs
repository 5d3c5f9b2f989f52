//! Salescope: computes the five sales questions and renders their results.
//!
//! This is the main entrypoint that wires configuration, data loading,
//! the computation pipeline and the presentation layer.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use salescope::cli::{Args, Command};
use salescope::config::{Config, DEFAULT_CONFIG_FILE};
use salescope::{load_datasets, render_dashboard, run, ArtifactWriter};
use tracing::{debug, info};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    match args.command {
        Command::InitConfig => handle_init_config(),
        Command::Run { .. } => {
            let config = load_config(&args)?;
            run_pipeline(&config)
        }
        Command::Render => {
            let config = load_config(&args)?;
            render(&config)
        }
    }
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_target(false)
        .compact()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Logging was already initialized");
    }
}

/// Config from `--config`, else `salescope.toml` if present, else defaults;
/// CLI flags override.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?.unwrap_or_default(),
    };
    config.merge_with_args(args);
    debug!(?config, "Configuration resolved");
    Ok(config)
}

fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);
    if path.exists() {
        anyhow::bail!("{DEFAULT_CONFIG_FILE} already exists; edit it or remove it first");
    }

    std::fs::write(path, Config::default_toml()?)
        .with_context(|| format!("Failed to write {DEFAULT_CONFIG_FILE}"))?;
    println!("✓ Created {DEFAULT_CONFIG_FILE} with default settings");
    Ok(())
}

/// Load both tables, answer all questions and persist the artifacts
fn run_pipeline(config: &Config) -> Result<()> {
    println!("=== Sales Questions Pipeline ===\n");
    let start_time = Instant::now();

    let datasets = load_datasets(config).context("Failed to load input data")?;
    println!(
        "✓ Data loaded: {} products, {} sales",
        datasets.products.height(),
        datasets.sales.height()
    );

    let writer = ArtifactWriter::new(&config.paths.output_dir);
    let summary = run(&datasets, &config.analysis, &writer)?;

    println!(
        "✓ Q1: {} products sold in at least {:.0}% of outlets",
        summary.coverage.height(),
        config.analysis.coverage_cutoff * 100.0
    );
    println!(
        "✓ Q2: {} products carry {:.0}% of liters sold",
        summary.pareto.selected.height(),
        config.analysis.pareto_cutoff * 100.0
    );
    println!(
        "✓ Q3: best outlet found for {} products",
        summary.frequency.height()
    );
    println!("✓ Q4: period variation = {}", summary.variation.change);
    match &summary.growth {
        Some(growth) => println!(
            "✓ Q5: {} grew {} from August to September",
            growth.description, growth.change
        ),
        None => println!("✗ Q5: target product not found"),
    }

    if !summary.failed.is_empty() {
        println!("\n✗ Could not write: {}", summary.failed.join(", "));
    }

    let total_time = start_time.elapsed();
    info!(elapsed_ms = total_time.as_millis() as u64, "Run complete");
    println!("\n=== Pipeline Complete ===");
    println!("Total processing time: {:.2}s", total_time.as_secs_f64());
    println!("Artifacts saved to: {}", config.paths.output_dir.display());

    Ok(())
}

/// Render charts and text panels from the artifacts of a previous run
fn render(config: &Config) -> Result<()> {
    for panel in render_dashboard(&config.paths.output_dir) {
        println!("{panel}");
    }
    Ok(())
}
