//! High-level circuit builder API.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::{Gate, GateSet};
use crate::op::GateOp;
use crate::qubit::QubitId;

/// A quantum circuit: an ordered list of gate operations followed by
/// computational-basis measurement of a set of qubits.
///
/// Measured qubits are kept sorted by index, which fixes the bit order of
/// result bitstrings (leftmost character = lowest measured qubit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Size of the qubit register.
    num_qubits: u32,
    /// Operations in application order.
    ops: Vec<GateOp>,
    /// Qubits measured at the end of the circuit, ascending.
    measured: Vec<QubitId>,
}

impl Circuit {
    /// Create a circuit with a given number of qubits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            ops: vec![],
            measured: vec![],
        }
    }

    fn check_qubit(&self, qubit: QubitId, gate_name: Option<&str>) -> IrResult<()> {
        if qubit.0 >= self.num_qubits {
            return Err(IrError::QubitOutOfRange {
                qubit,
                num_qubits: self.num_qubits,
                gate_name: gate_name.map(str::to_string),
            });
        }
        Ok(())
    }

    /// Append an operation.
    pub fn push(&mut self, op: GateOp) -> IrResult<&mut Self> {
        for &q in &op.qubits {
            self.check_qubit(q, Some(op.name()))?;
        }
        self.ops.push(op);
        Ok(self)
    }

    /// Append a sequence of operations.
    pub fn extend(&mut self, ops: impl IntoIterator<Item = GateOp>) -> IrResult<&mut Self> {
        for op in ops {
            self.push(op)?;
        }
        Ok(self)
    }

    // =========================================================================
    // Gates
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(GateOp::single(Gate::H, qubit)?)
    }

    /// Apply Ry rotation gate.
    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(GateOp::single(Gate::Ry(theta), qubit)?)
    }

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push(GateOp::cx(control, target)?)
    }

    // =========================================================================
    // Measurement
    // =========================================================================

    /// Declare a qubit as measured.
    pub fn measure(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.check_qubit(qubit, None)?;
        match self.measured.binary_search(&qubit) {
            Ok(_) => Err(IrError::DuplicateMeasurement(qubit)),
            Err(pos) => {
                self.measured.insert(pos, qubit);
                Ok(self)
            }
        }
    }

    /// Declare several qubits as measured.
    pub fn measure_qubits(
        &mut self,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        for q in qubits {
            self.measure(q)?;
        }
        Ok(self)
    }

    /// Measure every qubit in the register.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        self.measure_qubits((0..self.num_qubits).map(QubitId))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits as usize
    }

    /// Operations in application order.
    pub fn ops(&self) -> &[GateOp] {
        &self.ops
    }

    /// Measured qubits, ascending by index.
    pub fn measured(&self) -> &[QubitId] {
        &self.measured
    }

    /// Number of two-qubit gates.
    pub fn two_qubit_gate_count(&self) -> usize {
        self.ops.iter().filter(|op| op.qubits.len() == 2).count()
    }

    /// Check every operation against a native gate set.
    pub fn validate_gate_set(&self, gate_set: &GateSet) -> IrResult<()> {
        match self.ops.iter().find(|op| !gate_set.contains(op.gate.kind())) {
            Some(op) => Err(IrError::UnsupportedGate(op.name().to_string())),
            None => Ok(()),
        }
    }

    // =========================================================================
    // Common circuits
    // =========================================================================

    /// Create a Bell state circuit.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::with_size("bell", 2);
        circuit
            .h(QubitId(0))?
            .cx(QubitId(0), QubitId(1))?
            .measure_all()?;
        Ok(circuit)
    }
}
