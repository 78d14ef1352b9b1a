//! Correlation statistic from raw measurement counts.
//!
//! For Alice bit `a` and Bob bit `b` in every shot:
//!
//! ```text
//!   C  = (N_same − N_diff) / N_total
//!   se = 1 / √N_total                       (binomial, default)
//!   se = 2 · √(p(1 − p) / N_total)          (Bernoulli, p = N_same / N_total)
//! ```

use serde::{Deserialize, Serialize};

use locc_hal::{Counts, ExecutionResult};
use locc_ir::{Circuit, QubitId};

use crate::config::QubitRoles;
use crate::error::{ExperimentError, ExperimentResult};

/// Standard-error model for the correlation statistic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorModel {
    /// `1/√N`, independent of the observed correlation.
    #[default]
    Binomial,
    /// Propagated Bernoulli variance of the agreement fraction.
    Bernoulli,
}

/// Counts together with the layout they were measured in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountTable {
    /// Measured qubits, ascending; bitstring position `i` is `measured[i]`.
    pub measured: Vec<QubitId>,
    /// Shots requested for the circuit.
    pub shots: u32,
    /// Bitstring → count.
    pub counts: Counts,
}

impl CountTable {
    /// Create a table.
    pub fn new(measured: Vec<QubitId>, shots: u32, counts: Counts) -> Self {
        Self {
            measured,
            shots,
            counts,
        }
    }

    /// Pair a backend result with the circuit that produced it.
    pub fn from_execution(circuit: &Circuit, result: ExecutionResult) -> Self {
        Self::new(circuit.measured().to_vec(), result.shots, result.counts)
    }

    /// Bitstring position of `qubit`.
    pub fn position(&self, qubit: QubitId) -> Option<usize> {
        self.measured.iter().position(|&q| q == qubit)
    }

    /// Check widths, characters and the shot total.
    ///
    /// An empty table is `InsufficientData`; everything else that does not
    /// match the layout is `MalformedCounts`.
    pub fn validate(&self) -> ExperimentResult<()> {
        let width = self.measured.len();
        for (bitstring, _) in self.counts.iter() {
            if bitstring.len() != width {
                return Err(ExperimentError::MalformedCounts(format!(
                    "bitstring '{bitstring}' has width {}, expected {width}",
                    bitstring.len()
                )));
            }
            if !bitstring.bytes().all(|b| b == b'0' || b == b'1') {
                return Err(ExperimentError::MalformedCounts(format!(
                    "bitstring '{bitstring}' contains characters other than 0/1"
                )));
            }
        }

        let total = self.counts.total();
        if total == 0 {
            return Err(ExperimentError::InsufficientData(
                "count table has no shots".into(),
            ));
        }
        if total != u64::from(self.shots) {
            return Err(ExperimentError::MalformedCounts(format!(
                "counts sum to {total}, expected {} shots",
                self.shots
            )));
        }
        Ok(())
    }

    fn bit(bitstring: &str, position: usize) -> u8 {
        bitstring.as_bytes()[position]
    }
}

/// A correlation value with its standard error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationEstimate {
    /// C in [-1, 1].
    pub value: f64,
    /// Standard error of C.
    pub standard_error: f64,
    /// Shots the estimate is based on.
    pub shot_count: u64,
}

/// Computes C(Alice, Bob) from count tables.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationEstimator {
    roles: QubitRoles,
    model: ErrorModel,
}

impl CorrelationEstimator {
    /// Create an estimator for the given roles and error model.
    pub fn new(roles: QubitRoles, model: ErrorModel) -> Self {
        Self { roles, model }
    }

    /// Estimate the Alice–Bob correlation.
    ///
    /// The result does not depend on the order of entries in the table.
    pub fn estimate(&self, table: &CountTable) -> ExperimentResult<CorrelationEstimate> {
        table.validate()?;
        let alice = self.require(table, self.roles.alice, "alice")?;
        let bob = self.require(table, self.roles.bob, "bob")?;

        let (same, diff) = table
            .counts
            .iter()
            .fold((0u64, 0u64), |(same, diff), (bits, n)| {
                if CountTable::bit(bits, alice) == CountTable::bit(bits, bob) {
                    (same + n, diff)
                } else {
                    (same, diff + n)
                }
            });
        let total = same + diff;
        let n = total as f64;

        let value = (same as f64 - diff as f64) / n;
        let standard_error = match self.model {
            ErrorModel::Binomial => 1.0 / n.sqrt(),
            ErrorModel::Bernoulli => {
                let p = same as f64 / n;
                2.0 * (p * (1.0 - p) / n).sqrt()
            }
        };

        Ok(CorrelationEstimate {
            value,
            standard_error,
            shot_count: total,
        })
    }

    /// Fraction of shots with the marker in 0, or `None` if the marker was
    /// not measured.
    pub fn marker_zero_fraction(&self, table: &CountTable) -> ExperimentResult<Option<f64>> {
        table.validate()?;
        let Some(marker) = table.position(self.roles.marker) else {
            return Ok(None);
        };
        let zeros: u64 = table
            .counts
            .iter()
            .filter(|(bits, _)| CountTable::bit(bits, marker) == b'0')
            .map(|(_, n)| n)
            .sum();
        Ok(Some(zeros as f64 / table.counts.total() as f64))
    }

    fn require(&self, table: &CountTable, qubit: QubitId, role: &str) -> ExperimentResult<usize> {
        table.position(qubit).ok_or_else(|| {
            ExperimentError::MalformedCounts(format!("{role} ({qubit}) was not measured"))
        })
    }
}
