//! Qubit identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a qubit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QubitId(pub u32);

impl QubitId {
    /// Index into a statevector or bitstring.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qubit_display() {
        assert_eq!(format!("{}", QubitId(0)), "q0");
        assert_eq!(format!("{}", QubitId(2)), "q2");
    }

    #[test]
    fn test_qubit_ordering() {
        let mut qubits = vec![QubitId(2), QubitId(0), QubitId(1)];
        qubits.sort();
        assert_eq!(qubits, vec![QubitId(0), QubitId(1), QubitId(2)]);
    }

    #[test]
    fn test_qubit_serializes_as_integer() {
        let json = serde_json::to_string(&QubitId(2)).unwrap();
        assert_eq!(json, "2");
    }
}
