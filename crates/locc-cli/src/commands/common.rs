//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use locc_adapter_sim::SimulatorBackend;
use locc_experiment::{Analysis, ExperimentConfig};
use locc_hal::{BackendConfig, BackendFactory};

/// Load an experiment configuration from a YAML or JSON file.
///
/// Without a path the built-in defaults are used.
pub fn load_config(path: Option<&str>) -> Result<ExperimentConfig> {
    let Some(path) = path else {
        return Ok(ExperimentConfig::default());
    };
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        anyhow::bail!("File not found: {path}");
    }

    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;

    let ext = path_obj.extension().and_then(|e| e.to_str()).unwrap_or("");

    let config: ExperimentConfig = match ext.to_lowercase().as_str() {
        "json" => serde_json::from_str(&source)
            .with_context(|| format!("Invalid JSON configuration: {path}"))?,
        "yaml" | "yml" => serde_yaml_ng::from_str(&source)
            .with_context(|| format!("Invalid YAML configuration: {path}"))?,
        other => anyhow::bail!("Unsupported configuration format '{other}' (use .yaml or .json)"),
    };
    config.validate()?;
    Ok(config)
}

/// Build the simulator through its `BackendFactory`, sized to the roles in
/// `config`.
pub fn simulator(
    config: &ExperimentConfig,
    seed: Option<u64>,
    readout_error: Option<f64>,
    latency_ms: Option<u64>,
) -> Result<SimulatorBackend> {
    let mut backend_config = BackendConfig::new("simulator").with_extra(
        "max_qubits",
        serde_json::json!(config.roles.register_size()),
    );
    if let Some(seed) = seed {
        backend_config = backend_config.with_extra("seed", serde_json::json!(seed));
    }
    if let Some(p) = readout_error {
        backend_config = backend_config.with_extra("readout_error", serde_json::json!(p));
    }
    if let Some(ms) = latency_ms {
        backend_config = backend_config.with_extra("latency_ms", serde_json::json!(ms));
    }
    Ok(SimulatorBackend::from_config(backend_config)?)
}

fn signed(value: f64) -> String {
    format!("{value:+.4}")
}

fn sigma(z: Option<f64>) -> String {
    z.map_or_else(|| "-".to_string(), |z| format!("{z:.2}"))
}

/// Print a sweep analysis as a table followed by the summaries.
///
/// `threshold` is the σ level of the per-angle verdicts, `confirmation`
/// the level that confirms the reference-angle restoration failure.
pub fn print_analysis(analysis: &Analysis, threshold: f64, confirmation: f64) {
    println!(
        "\n  {:>8}  {:>9}  {:>9}  {:>9}  {:>18}  {:>6}  {:>18}  {:>6}  {:>6}  {:<7}",
        "angle",
        "standard",
        "no_rev",
        "with_rev",
        "gap ± err",
        "z",
        "std−with ± err",
        "z",
        "P(0)",
        "restore"
    );
    for row in &analysis.per_angle {
        let marker = if row.warning.is_some() {
            style("!").yellow().bold()
        } else {
            style(" ")
        };
        let p0 = row
            .marker_p0
            .map_or_else(|| "-".to_string(), |p| format!("{p:.3}"));
        let verdict = if row.restoration_failed {
            style("FAILED").red()
        } else {
            style("ok").green()
        };
        println!(
            "{} {:>8}  {:>9}  {:>9}  {:>9}  {:>9} ± {:<6.4}  {:>6}  {:>9} ± {:<6.4}  {:>6}  {:>6}  {}",
            marker,
            row.angle.to_string(),
            signed(row.standard),
            signed(row.no_reversal),
            signed(row.with_reversal),
            signed(row.gap.gap),
            row.gap.combined_error,
            sigma(row.gap.significance),
            signed(row.restoration_failure.gap),
            row.restoration_failure.combined_error,
            sigma(row.restoration_failure.significance),
            p0,
            verdict
        );
    }
    println!("  (P(0): marker erased after reversal; restore: FAILED beyond {threshold}σ)");

    let reference = &analysis.reference;
    println!(
        "\n{} Maximal destruction at {}: gap {} ± {:.4}",
        style("→").cyan().bold(),
        style(reference.angle).yellow(),
        signed(reference.gap.gap),
        reference.gap.combined_error
    );
    if reference.statistically_same {
        println!(
            "  {} Erasure and no-erasure agree within {threshold}σ",
            style("✓").green().bold()
        );
    } else {
        println!(
            "  {} Erasure changes the correlation beyond {threshold}σ",
            style("✗").red().bold()
        );
    }

    let failure = &analysis.restoration_failure;
    let p = failure
        .p_value
        .map_or_else(|| "-".to_string(), |p| format!("{p:.3e}"));
    println!(
        "  Restoration failure C(standard) − C(with_reversal): {} ± {:.4} ({}σ, p = {})",
        style(signed(failure.gap.gap)).bold(),
        failure.gap.combined_error,
        sigma(failure.gap.significance),
        p
    );
    if failure.confirmed {
        println!(
            "  {} CONFIRMED: erasure does not restore the Bell correlation (> {confirmation}σ)",
            style("✗").red().bold()
        );
    } else {
        println!(
            "  {} Not confirmed at {confirmation}σ",
            style("·").dim()
        );
    }

    let hardware = &analysis.hardware;
    println!(
        "\n  Mean standard correlation: {:.4} (floor {})",
        hardware.mean_standard, hardware.fidelity_floor
    );
    for warning in analysis.warnings() {
        println!("  {} {}", style("warning:").yellow().bold(), warning);
    }
}
