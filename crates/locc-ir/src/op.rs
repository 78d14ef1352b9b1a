//! Gate operations: a gate bound to its operand qubits.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IrError, IrResult};
use crate::gate::Gate;
use crate::qubit::QubitId;

/// A gate applied to specific qubits.
///
/// For two-qubit gates the first operand is the control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateOp {
    /// The gate.
    pub gate: Gate,
    /// Qubits this operation acts on.
    pub qubits: Vec<QubitId>,
}

impl GateOp {
    /// Create an operation, checking arity and operand uniqueness.
    pub fn new(gate: Gate, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<Self> {
        let qubits: Vec<_> = qubits.into_iter().collect();
        let expected = gate.num_qubits();
        if qubits.len() != expected as usize {
            return Err(IrError::QubitCountMismatch {
                gate_name: gate.name().to_string(),
                expected,
                got: qubits.len() as u32,
            });
        }
        if qubits.len() == 2 && qubits[0] == qubits[1] {
            return Err(IrError::DuplicateQubit {
                qubit: qubits[0],
                gate_name: Some(gate.name().to_string()),
            });
        }
        Ok(Self { gate, qubits })
    }

    /// Create a single-qubit operation.
    pub fn single(gate: Gate, qubit: QubitId) -> IrResult<Self> {
        Self::new(gate, [qubit])
    }

    /// Create a two-qubit operation.
    pub fn two(gate: Gate, control: QubitId, target: QubitId) -> IrResult<Self> {
        Self::new(gate, [control, target])
    }

    /// Y rotation on `qubit`.
    pub fn ry(theta: f64, qubit: QubitId) -> Self {
        Self {
            gate: Gate::Ry(theta),
            qubits: vec![qubit],
        }
    }

    /// Hadamard on `qubit`.
    pub fn h(qubit: QubitId) -> Self {
        Self {
            gate: Gate::H,
            qubits: vec![qubit],
        }
    }

    /// CNOT from `control` to `target`.
    pub fn cx(control: QubitId, target: QubitId) -> IrResult<Self> {
        Self::two(Gate::Cx, control, target)
    }

    /// The inverse operation on the same operands.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            gate: self.gate.inverse(),
            qubits: self.qubits.clone(),
        }
    }

    /// Get the name of the operation.
    pub fn name(&self) -> &'static str {
        self.gate.name()
    }
}

impl fmt::Display for GateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.gate)?;
        for (i, q) in self.qubits.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}{q}")?;
        }
        Ok(())
    }
}
