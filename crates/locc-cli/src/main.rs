//! LOCC Command-Line Interface
//!
//! Runs the quantum-erasure angle sweep on the local simulator, writes the
//! sweep record as JSON and re-analyzes saved records.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{analyze, circuits, run, version};

/// LOCC - quantum erasure under local operations and classical communication
#[derive(Parser)]
#[command(name = "locc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the angle sweep on the simulator and save the record
    Run {
        /// Experiment configuration (YAML or JSON)
        #[arg(short, long)]
        config: Option<String>,

        /// Shots per circuit
        #[arg(short, long)]
        shots: Option<u32>,

        /// Coupling angles in degrees, comma separated
        #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
        angles: Option<Vec<f64>>,

        /// Simulator RNG seed
        #[arg(long, env = "LOCC_SEED")]
        seed: Option<u64>,

        /// Per-bit readout flip probability of the simulator
        #[arg(long)]
        readout_error: Option<f64>,

        /// Simulated per-job latency in milliseconds
        #[arg(long)]
        latency_ms: Option<u64>,

        /// Dispatch circuits concurrently
        #[arg(long)]
        concurrent: bool,

        /// Output file for the JSON record
        #[arg(short, long, default_value = "sweep.json")]
        output: String,
    },

    /// Analyze a saved sweep record
    Analyze {
        /// Sweep record (JSON)
        input: String,

        /// Fidelity floor for the standard condition
        #[arg(long)]
        fidelity_floor: Option<f64>,

        /// Significance threshold in standard deviations
        #[arg(long)]
        threshold: Option<f64>,

        /// Significance that confirms a restoration failure
        #[arg(long)]
        confirmation: Option<f64>,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Print the three condition circuits for an angle
    Circuits {
        /// Coupling angle in degrees
        #[arg(short, long, default_value = "90", allow_negative_numbers = true)]
        angle: f64,

        /// Experiment configuration (YAML or JSON)
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Run {
            config,
            shots,
            angles,
            seed,
            readout_error,
            latency_ms,
            concurrent,
            output,
        } => {
            run::execute(&run::RunOptions {
                config: config.as_deref(),
                shots,
                angles: angles.as_deref(),
                seed,
                readout_error,
                latency_ms,
                concurrent,
                output: &output,
            })
            .await
        }

        Commands::Analyze {
            input,
            fidelity_floor,
            threshold,
            confirmation,
            format,
        } => analyze::execute(&input, fidelity_floor, threshold, confirmation, &format),

        Commands::Circuits { angle, config } => circuits::execute(angle, config.as_deref()),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
