//! Run command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use locc_experiment::{
    Angle, SignificanceAnalyzer, SweepMode, SweepOrchestrator, SweepProgress, SweepRecord,
};
use locc_hal::Backend;

use super::common::{load_config, print_analysis, simulator};

/// Flags of the run command.
pub struct RunOptions<'a> {
    pub config: Option<&'a str>,
    pub shots: Option<u32>,
    pub angles: Option<&'a [f64]>,
    pub seed: Option<u64>,
    pub readout_error: Option<f64>,
    pub latency_ms: Option<u64>,
    pub concurrent: bool,
    pub output: &'a str,
}

/// Execute the run command.
pub async fn execute(options: &RunOptions<'_>) -> Result<()> {
    let mut config = load_config(options.config)?;
    if let Some(shots) = options.shots {
        config.shots = shots;
    }
    if let Some(angles) = options.angles {
        config.angles = angles.iter().copied().map(Angle::from_degrees).collect();
    }
    if options.concurrent {
        config.sweep_mode = SweepMode::Concurrent;
    }

    let backend = simulator(
        &config,
        options.seed,
        options.readout_error,
        options.latency_ms,
    )?;

    let total = config.angles.len() * 3;
    println!(
        "{} Sweeping {} angles on {} ({} circuits, {} shots each)",
        style("→").cyan().bold(),
        config.angles.len(),
        style(backend.name()).yellow(),
        total,
        config.shots
    );

    let avail = backend.availability().await?;
    if !avail.is_available {
        anyhow::bail!(
            "Backend '{}' is not available: {}",
            backend.name(),
            avail.status_message.as_deref().unwrap_or("no reason given")
        );
    }

    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );
    let reporter = bar.clone();

    let result = SweepOrchestrator::new(&config, &backend)?
        .with_progress(move |p: SweepProgress| {
            reporter.set_position(p.completed as u64);
            reporter.set_message(format!("{} @ {}", p.kind, p.angle));
        })
        .run(&config)
        .await;
    bar.finish_and_clear();
    let result = result?;

    let analysis = SignificanceAnalyzer::from_config(&config).analyze(&result)?;

    let record = SweepRecord::new(&config, backend.name(), result);
    record.save(Path::new(options.output))?;
    info!("Wrote sweep record to {}", options.output);

    println!(
        "{} Saved record to {}",
        style("✓").green().bold(),
        style(options.output).green()
    );
    print_analysis(
        &analysis,
        config.significance_threshold,
        config.confirmation_threshold,
    );

    Ok(())
}
