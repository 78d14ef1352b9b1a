//! Persisted sweep records.
//!
//! A record stores the raw counts next to every derived statistic. Loading
//! recomputes the statistics from the counts and rejects the file if they
//! disagree, so a record on disk is always self-consistent.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::angle::Angle;
use crate::builder::ConditionKind;
use crate::config::{ExperimentConfig, QubitRoles};
use crate::error::{ExperimentError, ExperimentResult};
use crate::estimator::{CorrelationEstimator, ErrorModel};
use crate::sweep::SweepResult;

/// Run metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Device the sweep ran on.
    pub device: String,
    /// Backend name reported by the adapter.
    pub backend: String,
    /// Completion time.
    pub timestamp: DateTime<Utc>,
    /// Angles in sweep order.
    pub angles: Vec<Angle>,
    /// Shots per circuit.
    pub shots: u32,
    /// Qubit roles the circuits were built with.
    pub roles: QubitRoles,
    /// Error model the estimates were computed with.
    pub error_model: ErrorModel,
    /// Version of the software that wrote the record.
    pub version: String,
}

/// A sweep result with its metadata, as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRecord {
    /// Run metadata.
    pub metadata: RecordMetadata,
    /// Per-angle measurements.
    pub result: SweepResult,
}

impl SweepRecord {
    /// Wrap a finished sweep.
    pub fn new(config: &ExperimentConfig, backend: &str, result: SweepResult) -> Self {
        Self {
            metadata: RecordMetadata {
                device: config.device.clone(),
                backend: backend.to_string(),
                timestamp: Utc::now(),
                angles: result.angles().collect(),
                shots: result.shots,
                roles: config.roles,
                error_model: config.error_model,
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            result,
        }
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> ExperimentResult<String> {
        serde_json::to_string_pretty(self).map_err(ExperimentError::from)
    }

    /// Parse and verify a record.
    pub fn from_json(json: &str) -> ExperimentResult<Self> {
        let record: Self = serde_json::from_str(json)?;
        record.verify()?;
        Ok(record)
    }

    /// Write the record to a file.
    pub fn save(&self, path: &Path) -> ExperimentResult<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| {
            ExperimentError::Persistence(format!("Failed to write {}: {}", path.display(), e))
        })?;
        debug!("Saved sweep record to {}", path.display());
        Ok(())
    }

    /// Read and verify a record from a file.
    pub fn load(path: &Path) -> ExperimentResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            ExperimentError::Persistence(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Recompute every statistic from its counts and compare.
    pub fn verify(&self) -> ExperimentResult<()> {
        let meta = &self.metadata;
        let angles: Vec<Angle> = self.result.angles().collect();
        if angles != meta.angles {
            return Err(mismatch("angle list differs from the recorded points"));
        }
        if meta.shots != self.result.shots {
            return Err(mismatch("shot count differs from the recorded points"));
        }

        let estimator = CorrelationEstimator::new(meta.roles, meta.error_model);
        for point in &self.result.points {
            for (kind, condition) in ConditionKind::ALL.into_iter().zip(point.conditions()) {
                let at = format!("{} at {}", kind, point.angle);
                if condition.kind != kind {
                    return Err(mismatch(&format!("{at}: stored as {}", condition.kind)));
                }
                if condition.counts.shots != meta.shots {
                    return Err(mismatch(&format!("{at}: shot count differs")));
                }
                let estimate = estimator.estimate(&condition.counts).map_err(|e| {
                    ExperimentError::Persistence(format!("{at}: {e}"))
                })?;
                if estimate != condition.estimate {
                    return Err(mismatch(&format!("{at}: estimate does not match counts")));
                }
                let marker_p0 = estimator
                    .marker_zero_fraction(&condition.counts)
                    .map_err(|e| ExperimentError::Persistence(format!("{at}: {e}")))?;
                if marker_p0 != condition.marker_p0 {
                    return Err(mismatch(&format!("{at}: marker P(0) does not match counts")));
                }
            }
        }
        Ok(())
    }
}

fn mismatch(detail: &str) -> ExperimentError {
    ExperimentError::Persistence(format!("record failed verification: {detail}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::CountTable;
    use crate::sweep::{AnglePoint, ConditionResult};
    use locc_hal::Counts;
    use locc_ir::QubitId;

    fn condition(kind: ConditionKind, entries: &[(&str, u64)]) -> ConditionResult {
        let counts: Counts = entries.iter().map(|&(b, n)| (b, n)).collect();
        let measured = match kind {
            ConditionKind::Standard => vec![QubitId(0), QubitId(1)],
            _ => vec![QubitId(0), QubitId(1), QubitId(2)],
        };
        let table = CountTable::new(measured, counts.total() as u32, counts);
        let estimator = CorrelationEstimator::new(QubitRoles::default(), ErrorModel::Binomial);
        ConditionResult {
            kind,
            estimate: estimator.estimate(&table).unwrap(),
            marker_p0: estimator.marker_zero_fraction(&table).unwrap(),
            counts: table,
        }
    }

    fn record() -> SweepRecord {
        let point = AnglePoint {
            angle: Angle::from_degrees(30.0),
            standard: condition(ConditionKind::Standard, &[("00", 450), ("11", 430), ("01", 120)]),
            no_reversal: condition(
                ConditionKind::NoReversal,
                &[("000", 333), ("111", 333), ("011", 334)],
            ),
            with_reversal: condition(
                ConditionKind::WithReversal,
                &[("000", 470), ("110", 401), ("100", 129)],
            ),
        };
        let result = SweepResult {
            shots: 1000,
            points: vec![point],
        };
        SweepRecord::new(&ExperimentConfig::default(), "simulator", result)
    }

    #[test]
    fn test_json_roundtrip_is_exact() {
        let record = record();
        let back = SweepRecord::from_json(&record.to_json().unwrap()).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_tampered_estimate_rejected() {
        let mut record = record();
        record.result.points[0].no_reversal.estimate.value += 1e-9;
        let err = SweepRecord::from_json(&record.to_json().unwrap()).unwrap_err();
        assert!(matches!(err, ExperimentError::Persistence(_)));
    }

    #[test]
    fn test_tampered_counts_rejected() {
        let mut record = record();
        record.result.points[0].standard.counts.counts.insert("00", 1);
        assert!(record.verify().is_err());
    }

    #[test]
    fn test_invalid_json_is_persistence_error() {
        assert!(matches!(
            SweepRecord::from_json("{\"metadata\": 3}"),
            Err(ExperimentError::Persistence(_))
        ));
    }
}
