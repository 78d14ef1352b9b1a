//! Backend capabilities.

use serde::{Deserialize, Serialize};

use locc_ir::{Circuit, GateKind, GateSet};

use crate::backend::ValidationResult;

/// Static description of what a backend can run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the backend.
    pub name: String,
    /// Number of qubits available.
    pub num_qubits: u32,
    /// Gates the backend executes natively.
    pub gate_set: GateSet,
    /// Maximum number of shots per job.
    pub max_shots: u32,
    /// Whether this is a simulator (`true`) or real hardware (`false`).
    pub is_simulator: bool,
}

impl Capabilities {
    /// Check a shot count against `max_shots`.
    pub fn accepts_shots(&self, shots: u32) -> bool {
        (1..=self.max_shots).contains(&shots)
    }

    /// Create capabilities for a simulator.
    pub fn simulator(num_qubits: u32) -> Self {
        Self {
            name: "simulator".into(),
            num_qubits,
            gate_set: GateSet::new([
                GateKind::H,
                GateKind::Rx,
                GateKind::Ry,
                GateKind::Rz,
                GateKind::Cx,
            ]),
            max_shots: 1_000_000,
            is_simulator: true,
        }
    }

    /// Check a circuit against these capabilities.
    pub fn check(&self, circuit: &Circuit) -> ValidationResult {
        let mut reasons = vec![];
        if circuit.num_qubits() > self.num_qubits as usize {
            reasons.push(format!(
                "circuit '{}' uses {} qubits, backend has {}",
                circuit.name(),
                circuit.num_qubits(),
                self.num_qubits
            ));
        }
        if let Err(e) = circuit.validate_gate_set(&self.gate_set) {
            reasons.push(e.to_string());
        }
        if circuit.measured().is_empty() {
            reasons.push(format!("circuit '{}' measures no qubits", circuit.name()));
        }

        if reasons.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid { reasons }
        }
    }
}
