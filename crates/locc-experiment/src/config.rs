//! Experiment configuration.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use locc_ir::{GateKind, GateSet, QubitId};

use crate::angle::Angle;
use crate::error::{ExperimentError, ExperimentResult};
use crate::estimator::ErrorModel;

/// Device identifier of the superconducting QPU the experiment targets.
pub const DEFAULT_DEVICE: &str = "arn:aws:braket:us-west-1::device/qpu/rigetti/Ankaa-3";

/// Which physical qubit plays which part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QubitRoles {
    /// First half of the Bell pair; control of the coupling rotation.
    pub alice: QubitId,
    /// Second half of the Bell pair.
    pub bob: QubitId,
    /// Ancilla that records which-path information.
    pub marker: QubitId,
}

impl Default for QubitRoles {
    fn default() -> Self {
        Self {
            alice: QubitId(0),
            bob: QubitId(1),
            marker: QubitId(2),
        }
    }
}

impl QubitRoles {
    /// Reject role assignments that share a qubit.
    pub fn validate(&self) -> ExperimentResult<()> {
        let distinct: BTreeSet<_> = [self.alice, self.bob, self.marker].into_iter().collect();
        if distinct.len() != 3 {
            return Err(ExperimentError::InvalidCircuitSpec(format!(
                "qubit roles must be distinct (alice={}, bob={}, marker={})",
                self.alice, self.bob, self.marker
            )));
        }
        Ok(())
    }

    /// Register size needed to address every role.
    pub fn register_size(&self) -> u32 {
        self.alice.0.max(self.bob.0).max(self.marker.0) + 1
    }
}

/// How the orchestrator dispatches circuits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepMode {
    /// One circuit in flight at a time.
    #[default]
    Sequential,
    /// Up to `max_in_flight` circuits in flight; first failure cancels the rest.
    Concurrent,
}

/// Immutable configuration shared by every component of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Qubit role assignment.
    pub roles: QubitRoles,
    /// Gates the target device executes natively.
    pub native_gates: GateSet,
    /// C(standard) below this attaches a hardware quality warning.
    pub fidelity_floor: f64,
    /// Standard-error model for the correlation statistic.
    pub error_model: ErrorModel,
    /// Significance (in σ) below which conditions count as the same.
    pub significance_threshold: f64,
    /// Significance (in σ) at which the restoration failure counts as
    /// confirmed.
    pub confirmation_threshold: f64,
    /// Per-execution timeout in seconds.
    pub timeout_secs: u64,
    /// Dispatch mode.
    pub sweep_mode: SweepMode,
    /// Concurrency bound for [`SweepMode::Concurrent`].
    pub max_in_flight: usize,
    /// Coupling angles in degrees, in sweep order.
    pub angles: Vec<Angle>,
    /// Shots per circuit.
    pub shots: u32,
    /// Device identifier recorded with the results.
    pub device: String,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            roles: QubitRoles::default(),
            native_gates: GateSet::erasure_native(),
            fidelity_floor: 0.5,
            error_model: ErrorModel::Binomial,
            significance_threshold: 2.0,
            confirmation_threshold: 5.0,
            timeout_secs: 300,
            sweep_mode: SweepMode::Sequential,
            max_in_flight: 4,
            angles: [0.0, 30.0, 60.0, 90.0, 120.0, 150.0, 180.0]
                .into_iter()
                .map(Angle::from_degrees)
                .collect(),
            shots: 2000,
            device: DEFAULT_DEVICE.to_string(),
        }
    }
}

impl ExperimentConfig {
    /// Per-execution timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check that the configuration can build and run the experiment.
    pub fn validate(&self) -> ExperimentResult<()> {
        self.roles.validate()?;
        for kind in [GateKind::H, GateKind::Ry, GateKind::Cx] {
            if !self.native_gates.contains(kind) {
                return Err(ExperimentError::InvalidCircuitSpec(format!(
                    "native gate set lacks '{}'",
                    kind.name()
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.fidelity_floor) {
            return Err(ExperimentError::InvalidSweep(format!(
                "fidelity floor {} outside [0, 1]",
                self.fidelity_floor
            )));
        }
        if !(self.significance_threshold > 0.0 && self.confirmation_threshold > 0.0) {
            return Err(ExperimentError::InvalidSweep(
                "significance thresholds must be positive".into(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ExperimentError::InvalidSweep("timeout must be positive".into()));
        }
        if self.max_in_flight == 0 {
            return Err(ExperimentError::InvalidSweep(
                "max_in_flight must be positive".into(),
            ));
        }
        Ok(())
    }
}
