//! LOCC Circuit Representation
//!
//! This crate provides the core data structures for the quantum circuits
//! used by the erasure experiment. Circuits are small, fixed-shape programs:
//! an ordered list of gate operations drawn from a closed gate set, followed
//! by computational-basis measurement of a declared set of qubits.
//!
//! # Core Components
//!
//! - **Qubits**: [`QubitId`] for addressing qubits
//! - **Gates**: [`Gate`] for the closed set of supported gates, [`GateKind`]
//!   and [`GateSet`] to describe what a device accepts natively
//! - **Operations**: [`GateOp`] binding a gate to its operands
//! - **Circuit**: [`Circuit`] builder and value type
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use locc_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell_state", 2);
//!
//! // |00⟩ → (|00⟩ + |11⟩)/√2
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.ops().len(), 2);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `H` | 1 | Hadamard gate |
//! | `Rx`, `Ry`, `Rz` | 1 | Rotation gates (radians) |
//! | `CX` | 2 | Controlled-NOT (CNOT) |

pub mod circuit;
pub mod error;
pub mod gate;
pub mod op;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::{Gate, GateKind, GateSet};
pub use op::GateOp;
pub use qubit::QubitId;
