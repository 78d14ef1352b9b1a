//! Experiment error types.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use locc_hal::HalError;
use locc_ir::IrError;

use crate::angle::Angle;

/// Result type for experiment operations.
pub type ExperimentResult<T> = Result<T, ExperimentError>;

/// Fatal errors of the experiment pipeline.
///
/// Any of these halts the sweep at the point of failure; no partial
/// statistics are produced.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExperimentError {
    /// Qubit roles or gates that cannot form a valid circuit.
    #[error("Invalid circuit specification: {0}")]
    InvalidCircuitSpec(String),

    /// The execution backend failed, including timeouts.
    #[error("Backend error: {0}")]
    Backend(#[from] HalError),

    /// A count table with zero total shots.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Counts that do not match the measured layout or requested shots.
    #[error("Malformed counts: {0}")]
    MalformedCounts(String),

    /// Sweep parameters that cannot produce a result.
    #[error("Invalid sweep: {0}")]
    InvalidSweep(String),

    /// Reading or writing a persisted record failed.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl From<IrError> for ExperimentError {
    fn from(e: IrError) -> Self {
        ExperimentError::InvalidCircuitSpec(e.to_string())
    }
}

impl From<serde_json::Error> for ExperimentError {
    fn from(e: serde_json::Error) -> Self {
        ExperimentError::Persistence(e.to_string())
    }
}

/// Non-fatal flag: the standard Bell correlation at an angle did not exceed
/// the configured fidelity floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareQualityWarning {
    /// Angle the warning applies to.
    pub angle: Angle,
    /// Measured C(standard).
    pub correlation: f64,
    /// Configured floor.
    pub floor: f64,
}

impl fmt::Display for HardwareQualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "standard correlation {:.3} at {} does not exceed the fidelity floor {:.3}",
            self.correlation, self.angle, self.floor
        )
    }
}
