//! Controlled-RY synthesis over the RY + CX gate set.
//!
//! ```text
//!   t: ─RY(θ/4)─⊕─RY(−θ/2)─⊕─RY(θ/4)─
//!               │          │
//!   c: ─────────●──────────●─────────
//! ```
//!
//! With the control in |0⟩ the target rotations sum to zero. With the
//! control in |1⟩ the CX pair conjugates the middle rotation to RY(+θ/2),
//! so the target sees RY(θ) in total.

use locc_ir::{GateKind, GateOp, GateSet, QubitId};

use crate::angle::Angle;
use crate::error::{ExperimentError, ExperimentResult};

/// Number of operations in one controlled rotation.
pub const DECOMPOSITION_LEN: usize = 5;

/// Expresses controlled Y rotations in native gates.
#[derive(Debug, Clone, Copy)]
pub struct GateDecomposer;

impl GateDecomposer {
    /// Create a decomposer for a device with the given native gates.
    ///
    /// Fails if the set lacks RY or CX.
    pub fn new(native: &GateSet) -> ExperimentResult<Self> {
        for kind in [GateKind::Ry, GateKind::Cx] {
            if !native.contains(kind) {
                return Err(ExperimentError::InvalidCircuitSpec(format!(
                    "controlled rotation needs native '{}'",
                    kind.name()
                )));
            }
        }
        Ok(Self)
    }

    /// Controlled RY(`angle`) from `control` onto `target`.
    ///
    /// Any real angle is accepted. The decomposition of `-angle` is the
    /// reverse-order inverse of this one.
    pub fn decompose_controlled_rotation(
        &self,
        control: QubitId,
        target: QubitId,
        angle: Angle,
    ) -> ExperimentResult<[GateOp; DECOMPOSITION_LEN]> {
        let quarter = angle.scaled(0.25).radians();
        let half = angle.scaled(0.5).radians();
        Ok([
            GateOp::ry(quarter, target),
            GateOp::cx(control, target)?,
            GateOp::ry(-half, target),
            GateOp::cx(control, target)?,
            GateOp::ry(quarter, target),
        ])
    }
}
