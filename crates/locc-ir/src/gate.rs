//! Quantum gate types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Gates with known semantics.
///
/// Rotation angles are in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gate", content = "angle", rename_all = "lowercase")]
pub enum Gate {
    /// Hadamard gate.
    H,
    /// Rotation around X axis.
    Rx(f64),
    /// Rotation around Y axis.
    Ry(f64),
    /// Rotation around Z axis.
    Rz(f64),
    /// Controlled-X (CNOT) gate.
    Cx,
}

impl Gate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Get the payload-free tag of this gate.
    #[inline]
    pub fn kind(&self) -> GateKind {
        match self {
            Gate::H => GateKind::H,
            Gate::Rx(_) => GateKind::Rx,
            Gate::Ry(_) => GateKind::Ry,
            Gate::Rz(_) => GateKind::Rz,
            Gate::Cx => GateKind::Cx,
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        self.kind().num_qubits()
    }

    /// Rotation angle, if this is a rotation gate.
    pub fn angle(&self) -> Option<f64> {
        match self {
            Gate::Rx(theta) | Gate::Ry(theta) | Gate::Rz(theta) => Some(*theta),
            Gate::H | Gate::Cx => None,
        }
    }

    /// The inverse gate. H and CX are self-inverse.
    #[must_use]
    pub fn inverse(&self) -> Self {
        match self {
            Gate::H => Gate::H,
            Gate::Rx(theta) => Gate::Rx(-theta),
            Gate::Ry(theta) => Gate::Ry(-theta),
            Gate::Rz(theta) => Gate::Rz(-theta),
            Gate::Cx => Gate::Cx,
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.angle() {
            Some(theta) => write!(f, "{}({theta:.6})", self.name()),
            None => write!(f, "{}", self.name()),
        }
    }
}

/// Gate tag without parameters, used to describe gate sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateKind {
    /// Hadamard.
    H,
    /// X rotation.
    Rx,
    /// Y rotation.
    Ry,
    /// Z rotation.
    Rz,
    /// CNOT.
    Cx,
}

impl GateKind {
    /// Get the name of this gate kind.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            GateKind::H => "h",
            GateKind::Rx => "rx",
            GateKind::Ry => "ry",
            GateKind::Rz => "rz",
            GateKind::Cx => "cx",
        }
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            GateKind::H | GateKind::Rx | GateKind::Ry | GateKind::Rz => 1,
            GateKind::Cx => 2,
        }
    }
}

/// A set of gates a device accepts natively.
///
/// Kinds are kept sorted and unique, so equality ignores listing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<GateKind>", from = "Vec<GateKind>")]
pub struct GateSet(Vec<GateKind>);

impl GateSet {
    /// Create a gate set from a list of kinds. Duplicates are removed.
    pub fn new(kinds: impl IntoIterator<Item = GateKind>) -> Self {
        let mut kinds: Vec<_> = kinds.into_iter().collect();
        kinds.sort();
        kinds.dedup();
        Self(kinds)
    }

    /// H, RY and CX: the gates the erasure circuits are built from.
    pub fn erasure_native() -> Self {
        Self::new([GateKind::H, GateKind::Ry, GateKind::Cx])
    }

    /// Check membership.
    pub fn contains(&self, kind: GateKind) -> bool {
        self.0.contains(&kind)
    }

    /// Iterate over the kinds in the set.
    pub fn iter(&self) -> impl Iterator<Item = GateKind> + '_ {
        self.0.iter().copied()
    }
}

impl From<Vec<GateKind>> for GateSet {
    fn from(kinds: Vec<GateKind>) -> Self {
        Self::new(kinds)
    }
}

impl From<GateSet> for Vec<GateKind> {
    fn from(set: GateSet) -> Self {
        set.0
    }
}

impl Default for GateSet {
    fn default() -> Self {
        Self::erasure_native()
    }
}
