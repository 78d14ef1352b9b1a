//! Circuits command implementation.

use anyhow::Result;
use console::style;

use locc_experiment::{Angle, CircuitBuilder, ConditionKind};

use super::common::load_config;

/// Execute the circuits command.
pub fn execute(degrees: f64, config: Option<&str>) -> Result<()> {
    let config = load_config(config)?;
    let builder = CircuitBuilder::new(&config)?;
    let angle = Angle::from_degrees(degrees);
    let roles = builder.roles();

    println!(
        "{} Conditions at {} (alice {}, bob {}, marker {})",
        style("→").cyan().bold(),
        style(angle).yellow(),
        roles.alice,
        roles.bob,
        roles.marker
    );

    for kind in ConditionKind::ALL {
        let circuit = builder.build_condition(kind, angle)?;
        println!(
            "\n  {} ({} ops, {} two-qubit)",
            style(circuit.name()).bold(),
            circuit.ops().len(),
            circuit.two_qubit_gate_count()
        );
        for op in circuit.ops() {
            println!("    {op}");
        }
        let measured: Vec<String> = circuit.measured().iter().map(ToString::to_string).collect();
        println!("    measure {}", measured.join(", "));
    }

    Ok(())
}
