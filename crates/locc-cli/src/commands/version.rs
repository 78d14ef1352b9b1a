//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - quantum erasure under LOCC",
        style("locc").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  locc-ir           Circuit representation");
    println!("  locc-hal          Backend abstraction");
    println!("  locc-adapter-sim  Statevector simulator backend");
    println!("  locc-experiment   Sweep, estimation and analysis");
    println!();
    println!("License: {}", style("Apache-2.0").dim());
}
