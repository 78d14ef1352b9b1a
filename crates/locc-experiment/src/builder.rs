//! Circuits for the three experimental conditions.

use serde::{Deserialize, Serialize};
use std::fmt;

use locc_ir::{Circuit, GateSet};

use crate::angle::Angle;
use crate::config::{ExperimentConfig, QubitRoles};
use crate::decompose::GateDecomposer;
use crate::error::ExperimentResult;

/// Experimental condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    /// Bell pair on Alice and Bob; the marker is untouched and unmeasured.
    Standard,
    /// Bell pair, then a controlled rotation Alice → Marker.
    NoReversal,
    /// As `NoReversal`, followed by the inverse rotation.
    WithReversal,
}

impl ConditionKind {
    /// All conditions in sweep order.
    pub const ALL: [ConditionKind; 3] = [
        ConditionKind::Standard,
        ConditionKind::NoReversal,
        ConditionKind::WithReversal,
    ];

    /// Short name.
    pub fn name(self) -> &'static str {
        match self {
            ConditionKind::Standard => "standard",
            ConditionKind::NoReversal => "no_reversal",
            ConditionKind::WithReversal => "with_reversal",
        }
    }

    /// Whether the marker qubit is measured.
    pub fn measures_marker(self) -> bool {
        !matches!(self, ConditionKind::Standard)
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Builds the circuit for a (condition, angle) pair.
#[derive(Debug, Clone)]
pub struct CircuitBuilder {
    roles: QubitRoles,
    native: GateSet,
    decomposer: GateDecomposer,
}

impl CircuitBuilder {
    /// Create a builder, rejecting role or gate-set configurations that
    /// cannot produce the experiment's circuits.
    pub fn new(config: &ExperimentConfig) -> ExperimentResult<Self> {
        config.roles.validate()?;
        let decomposer = GateDecomposer::new(&config.native_gates)?;
        Ok(Self {
            roles: config.roles,
            native: config.native_gates.clone(),
            decomposer,
        })
    }

    /// The role assignment circuits are built for.
    pub fn roles(&self) -> QubitRoles {
        self.roles
    }

    /// Build the circuit for `kind` at `angle`. `Standard` ignores the angle.
    pub fn build_condition(&self, kind: ConditionKind, angle: Angle) -> ExperimentResult<Circuit> {
        let QubitRoles { alice, bob, marker } = self.roles;
        let name = match kind {
            ConditionKind::Standard => kind.name().to_string(),
            _ => format!("{}_{}", kind.name(), angle.degrees()),
        };

        let mut circuit = Circuit::with_size(name, self.roles.register_size());
        circuit.h(alice)?.cx(alice, bob)?;

        if kind.measures_marker() {
            circuit.extend(
                self.decomposer
                    .decompose_controlled_rotation(alice, marker, angle)?,
            )?;
        }
        if kind == ConditionKind::WithReversal {
            circuit.extend(
                self.decomposer
                    .decompose_controlled_rotation(alice, marker, -angle)?,
            )?;
        }

        circuit.measure_qubits([alice, bob])?;
        if kind.measures_marker() {
            circuit.measure(marker)?;
        }
        circuit.validate_gate_set(&self.native)?;
        Ok(circuit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExperimentError;
    use locc_ir::QubitId;

    fn builder() -> CircuitBuilder {
        CircuitBuilder::new(&ExperimentConfig::default()).unwrap()
    }

    #[test]
    fn test_standard_ignores_angle() {
        let b = builder();
        let a = b
            .build_condition(ConditionKind::Standard, Angle::from_degrees(0.0))
            .unwrap();
        let c = b
            .build_condition(ConditionKind::Standard, Angle::from_degrees(90.0))
            .unwrap();
        assert_eq!(a, c);
        assert_eq!(a.ops().len(), 2);
        assert_eq!(a.measured(), &[QubitId(0), QubitId(1)]);
    }

    #[test]
    fn test_condition_shapes() {
        let b = builder();
        let angle = Angle::from_degrees(60.0);
        let no_rev = b.build_condition(ConditionKind::NoReversal, angle).unwrap();
        let with_rev = b.build_condition(ConditionKind::WithReversal, angle).unwrap();

        assert_eq!(no_rev.ops().len(), 7);
        assert_eq!(with_rev.ops().len(), 12);
        assert_eq!(no_rev.two_qubit_gate_count(), 3);
        assert_eq!(with_rev.two_qubit_gate_count(), 5);
        assert_eq!(with_rev.measured(), &[QubitId(0), QubitId(1), QubitId(2)]);
        assert_eq!(&with_rev.ops()[..7], no_rev.ops());
        assert_eq!(no_rev.name(), "no_reversal_60");
    }

    #[test]
    fn test_custom_roles() {
        let config = ExperimentConfig {
            roles: QubitRoles {
                alice: QubitId(4),
                bob: QubitId(1),
                marker: QubitId(2),
            },
            ..ExperimentConfig::default()
        };
        let circuit = CircuitBuilder::new(&config)
            .unwrap()
            .build_condition(ConditionKind::NoReversal, Angle::from_degrees(30.0))
            .unwrap();
        assert_eq!(circuit.num_qubits(), 5);
        assert_eq!(circuit.measured(), &[QubitId(1), QubitId(2), QubitId(4)]);
    }

    #[test]
    fn test_duplicate_roles_fail_before_building() {
        let config = ExperimentConfig {
            roles: QubitRoles {
                alice: QubitId(0),
                bob: QubitId(0),
                marker: QubitId(2),
            },
            ..ExperimentConfig::default()
        };
        assert!(matches!(
            CircuitBuilder::new(&config),
            Err(ExperimentError::InvalidCircuitSpec(_))
        ));
    }
}
