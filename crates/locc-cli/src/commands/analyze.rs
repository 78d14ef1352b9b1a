//! Analyze command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;

use locc_experiment::{ExperimentConfig, SignificanceAnalyzer, SweepRecord};

use super::common::print_analysis;

/// Execute the analyze command.
pub fn execute(
    input: &str,
    fidelity_floor: Option<f64>,
    threshold: Option<f64>,
    confirmation: Option<f64>,
    format: &str,
) -> Result<()> {
    let record = SweepRecord::load(Path::new(input))?;

    let defaults = ExperimentConfig::default();
    let floor = fidelity_floor.unwrap_or(defaults.fidelity_floor);
    if !(0.0..=1.0).contains(&floor) {
        anyhow::bail!("Fidelity floor {floor} outside [0, 1]");
    }
    let threshold = threshold.unwrap_or(defaults.significance_threshold);
    let confirmation = confirmation.unwrap_or(defaults.confirmation_threshold);
    if !(threshold > 0.0 && confirmation > 0.0) {
        anyhow::bail!("Significance thresholds must be positive");
    }
    let analysis = SignificanceAnalyzer::new(floor, threshold)
        .with_confirmation(confirmation)
        .analyze(&record.result)?;

    match format.to_lowercase().as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&analysis)?),
        "table" => {
            let meta = &record.metadata;
            println!(
                "{} {} ({} on {}, {} shots, {})",
                style("→").cyan().bold(),
                style(input).green(),
                meta.device,
                style(&meta.backend).yellow(),
                meta.shots,
                meta.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
            );
            print_analysis(&analysis, threshold, confirmation);
        }
        other => anyhow::bail!("Unknown format: '{other}'. Available: table, json"),
    }

    Ok(())
}
