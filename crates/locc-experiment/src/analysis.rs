//! Significance of the restoration gap across a sweep.
//!
//! For two conditions with estimates `(C₁, se₁)` and `(C₂, se₂)`:
//!
//! ```text
//!   gap            = C₁ − C₂
//!   combined_error = √(se₁² + se₂²)
//!   significance   = |gap| / combined_error      (σ units)
//!   p              = 2 · (1 − Φ(significance))   (two-sided)
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::angle::Angle;
use crate::config::ExperimentConfig;
use crate::error::{ExperimentError, ExperimentResult, HardwareQualityWarning};
use crate::estimator::CorrelationEstimate;
use crate::sweep::{AnglePoint, SweepResult};

/// Difference between two correlation estimates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RestorationGap {
    /// Signed difference.
    pub gap: f64,
    /// Root-sum-square of the two standard errors.
    pub combined_error: f64,
    /// `|gap| / combined_error`; `None` when the combined error is zero.
    pub significance: Option<f64>,
}

impl RestorationGap {
    /// `minuend − subtrahend` with propagated uncertainty.
    pub fn between(minuend: &CorrelationEstimate, subtrahend: &CorrelationEstimate) -> Self {
        let gap = minuend.value - subtrahend.value;
        let combined_error = minuend.standard_error.hypot(subtrahend.standard_error);
        let significance = (combined_error > 0.0).then(|| gap.abs() / combined_error);
        Self {
            gap,
            combined_error,
            significance,
        }
    }

    /// Two-sided normal p-value of the gap.
    pub fn p_value(&self) -> Option<f64> {
        self.significance.map(two_sided_p_value)
    }

    /// Whether the gap is below `threshold` σ.
    ///
    /// With zero combined error only an exactly zero gap counts as the same.
    pub fn is_within(&self, threshold: f64) -> bool {
        match self.significance {
            Some(z) => z < threshold,
            None => self.gap == 0.0,
        }
    }

    /// Whether the gap is beyond `threshold` σ.
    ///
    /// With zero combined error any non-zero gap exceeds.
    pub fn exceeds(&self, threshold: f64) -> bool {
        match self.significance {
            Some(z) => z > threshold,
            None => self.gap != 0.0,
        }
    }
}

/// Per-angle summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngleAnalysis {
    /// Coupling angle.
    pub angle: Angle,
    /// C(standard).
    pub standard: f64,
    /// C(no_reversal).
    pub no_reversal: f64,
    /// C(with_reversal).
    pub with_reversal: f64,
    /// C(with_reversal) − C(no_reversal).
    pub gap: RestorationGap,
    /// C(standard) − C(with_reversal).
    pub restoration_failure: RestorationGap,
    /// Erasure fell short of the Bell correlation beyond the significance
    /// threshold.
    pub restoration_failed: bool,
    /// Fraction of with-reversal shots that found the marker back in 0.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub marker_p0: Option<f64>,
    /// Set when C(standard) does not exceed the fidelity floor.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub warning: Option<HardwareQualityWarning>,
}

/// Erasure-vs-no-erasure verdict at the reference angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSummary {
    /// Angle whose no-reversal correlation is closest to zero.
    pub angle: Angle,
    /// C(with_reversal) − C(no_reversal) at that angle.
    pub gap: RestorationGap,
    /// Whether the gap is below the significance threshold.
    pub statistically_same: bool,
}

/// How far erasure falls short of the undisturbed Bell correlation at the
/// reference angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RestorationFailure {
    /// Reference angle.
    pub angle: Angle,
    /// C(standard) − C(with_reversal).
    pub gap: RestorationGap,
    /// Two-sided p-value of the gap.
    pub p_value: Option<f64>,
    /// The gap exceeds the confirmation threshold.
    pub confirmed: bool,
}

/// Aggregate view of the standard (Bell-only) condition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HardwareSummary {
    /// Mean C(standard) over all angles.
    pub mean_standard: f64,
    /// Number of angles at or below the floor.
    pub flagged: usize,
    /// Fidelity floor used.
    pub fidelity_floor: f64,
}

/// Full analysis of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// One entry per angle, in sweep order.
    pub per_angle: Vec<AngleAnalysis>,
    /// Reference-angle verdict.
    pub reference: ReferenceSummary,
    /// Restoration-failure test at the reference angle.
    pub restoration_failure: RestorationFailure,
    /// Hardware quality.
    pub hardware: HardwareSummary,
}

impl Analysis {
    /// Entry for an angle.
    pub fn at(&self, angle: Angle) -> Option<&AngleAnalysis> {
        self.per_angle.iter().find(|a| a.angle == angle)
    }

    /// All hardware quality warnings, in sweep order.
    pub fn warnings(&self) -> impl Iterator<Item = &HardwareQualityWarning> {
        self.per_angle.iter().filter_map(|a| a.warning.as_ref())
    }
}

/// Turns a sweep into gaps, significances and warnings.
#[derive(Debug, Clone, Copy)]
pub struct SignificanceAnalyzer {
    fidelity_floor: f64,
    threshold: f64,
    confirmation: f64,
}

impl SignificanceAnalyzer {
    /// Create an analyzer with explicit thresholds. Restoration failure is
    /// confirmed beyond 5σ.
    pub fn new(fidelity_floor: f64, significance_threshold: f64) -> Self {
        Self {
            fidelity_floor,
            threshold: significance_threshold,
            confirmation: 5.0,
        }
    }

    /// Set the σ level that confirms a restoration failure.
    #[must_use]
    pub fn with_confirmation(mut self, sigma: f64) -> Self {
        self.confirmation = sigma;
        self
    }

    /// Create an analyzer from a configuration.
    pub fn from_config(config: &ExperimentConfig) -> Self {
        Self::new(config.fidelity_floor, config.significance_threshold)
            .with_confirmation(config.confirmation_threshold)
    }

    /// Analyze a sweep.
    pub fn analyze(&self, result: &SweepResult) -> ExperimentResult<Analysis> {
        let reference_point = reference_point(&result.points).ok_or_else(|| {
            ExperimentError::InsufficientData("sweep has no angles to analyze".into())
        })?;

        let per_angle: Vec<_> = result.points.iter().map(|p| self.analyze_point(p)).collect();
        for warning in per_angle.iter().filter_map(|a| a.warning.as_ref()) {
            warn!("{warning}");
        }

        let reference_gap = RestorationGap::between(
            &reference_point.with_reversal.estimate,
            &reference_point.no_reversal.estimate,
        );
        let reference = ReferenceSummary {
            angle: reference_point.angle,
            gap: reference_gap,
            statistically_same: reference_gap.is_within(self.threshold),
        };

        let failure_gap = RestorationGap::between(
            &reference_point.standard.estimate,
            &reference_point.with_reversal.estimate,
        );
        let restoration_failure = RestorationFailure {
            angle: reference_point.angle,
            gap: failure_gap,
            p_value: failure_gap.p_value(),
            confirmed: failure_gap.exceeds(self.confirmation),
        };

        let mean_standard =
            per_angle.iter().map(|a| a.standard).sum::<f64>() / per_angle.len() as f64;
        let hardware = HardwareSummary {
            mean_standard,
            flagged: per_angle.iter().filter(|a| a.warning.is_some()).count(),
            fidelity_floor: self.fidelity_floor,
        };

        debug!(
            reference = %reference.angle,
            gap = reference.gap.gap,
            failure_gap = failure_gap.gap,
            "analysis complete"
        );

        Ok(Analysis {
            per_angle,
            reference,
            restoration_failure,
            hardware,
        })
    }

    fn analyze_point(&self, point: &AnglePoint) -> AngleAnalysis {
        let standard = point.standard.estimate.value;
        let warning = (standard <= self.fidelity_floor).then(|| HardwareQualityWarning {
            angle: point.angle,
            correlation: standard,
            floor: self.fidelity_floor,
        });
        let restoration_failure =
            RestorationGap::between(&point.standard.estimate, &point.with_reversal.estimate);
        AngleAnalysis {
            angle: point.angle,
            standard,
            no_reversal: point.no_reversal.estimate.value,
            with_reversal: point.with_reversal.estimate.value,
            gap: RestorationGap::between(
                &point.with_reversal.estimate,
                &point.no_reversal.estimate,
            ),
            restoration_failure,
            restoration_failed: restoration_failure.exceeds(self.threshold),
            marker_p0: point.with_reversal.marker_p0,
            warning,
        }
    }
}

/// The point whose no-reversal |C| is smallest; the earliest wins ties.
fn reference_point(points: &[AnglePoint]) -> Option<&AnglePoint> {
    points.iter().fold(None, |best: Option<&AnglePoint>, p| match best {
        Some(b) if b.no_reversal.estimate.value.abs() <= p.no_reversal.estimate.value.abs() => {
            Some(b)
        }
        _ => Some(p),
    })
}

/// Two-sided p-value for a standard normal score.
pub fn two_sided_p_value(z: f64) -> f64 {
    (2.0 * (1.0 - normal_cdf(z.abs()))).clamp(0.0, 1.0)
}

/// Standard normal CDF.
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Abramowitz–Stegun 7.1.26, absolute error below 1.5e-7.
fn erf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();

    sign * y
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ConditionKind;
    use crate::config::QubitRoles;
    use crate::estimator::{CorrelationEstimator, CountTable, ErrorModel};
    use crate::sweep::ConditionResult;
    use locc_hal::Counts;
    use locc_ir::QubitId;

    fn estimate(value: f64, shots: u64) -> CorrelationEstimate {
        CorrelationEstimate {
            value,
            standard_error: 1.0 / (shots as f64).sqrt(),
            shot_count: shots,
        }
    }

    fn condition(kind: ConditionKind, value: f64) -> ConditionResult {
        ConditionResult {
            kind,
            estimate: estimate(value, 2000),
            counts: CountTable::new(vec![], 2000, Counts::new()),
            marker_p0: None,
        }
    }

    fn point(degrees: f64, standard: f64, no_rev: f64, with_rev: f64) -> AnglePoint {
        AnglePoint {
            angle: Angle::from_degrees(degrees),
            standard: condition(ConditionKind::Standard, standard),
            no_reversal: condition(ConditionKind::NoReversal, no_rev),
            with_reversal: condition(ConditionKind::WithReversal, with_rev),
        }
    }

    fn sweep(points: Vec<AnglePoint>) -> SweepResult {
        SweepResult {
            shots: 2000,
            points,
        }
    }

    #[test]
    fn test_gap_and_significance() {
        let gap = RestorationGap::between(&estimate(0.10, 2000), &estimate(0.02, 2000));
        let se = 1.0 / 2000f64.sqrt();
        assert!((gap.gap - 0.08).abs() < 1e-12);
        assert!((gap.combined_error - se * 2f64.sqrt()).abs() < 1e-12);
        assert!((gap.significance.unwrap() - 0.08 / (se * 2f64.sqrt())).abs() < 1e-9);
    }

    #[test]
    fn test_zero_error_leaves_significance_undefined() {
        let exact = CorrelationEstimate {
            value: 1.0,
            standard_error: 0.0,
            shot_count: 10,
        };
        let gap = RestorationGap::between(&exact, &exact);
        assert_eq!(gap.significance, None);
        assert_eq!(gap.p_value(), None);
        assert!(gap.is_within(2.0));
    }

    #[test]
    fn test_normal_cdf() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((normal_cdf(1.96) - 0.975).abs() < 1e-4);
        assert!((two_sided_p_value(1.96) - 0.05).abs() < 1e-3);
        assert!((two_sided_p_value(-1.96) - 0.05).abs() < 1e-3);
        assert!(two_sided_p_value(40.0) >= 0.0);
    }

    #[test]
    fn test_reference_tie_goes_to_earliest() {
        let result = sweep(vec![
            point(0.0, 0.9, 0.8, 0.0),
            point(60.0, 0.9, -0.1, 0.0),
            point(120.0, 0.9, 0.1, 0.0),
        ]);
        let analysis = SignificanceAnalyzer::new(0.5, 2.0).analyze(&result).unwrap();
        assert_eq!(analysis.reference.angle, Angle::from_degrees(60.0));
    }

    #[test]
    fn test_low_standard_is_flagged_not_fatal() {
        let result = sweep(vec![point(0.0, 0.9, 0.9, 0.9), point(90.0, 0.3, 0.0, 0.0)]);
        let analysis = SignificanceAnalyzer::new(0.5, 2.0).analyze(&result).unwrap();

        assert!(analysis.at(Angle::from_degrees(0.0)).unwrap().warning.is_none());
        let warnings: Vec<_> = analysis.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].angle, Angle::from_degrees(90.0));
        assert_eq!(analysis.hardware.flagged, 1);
        assert!((analysis.hardware.mean_standard - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_standard_at_floor_is_flagged() {
        let mut counts = Counts::new();
        counts.insert("00", 1500);
        counts.insert("01", 500);
        let table = CountTable::new(vec![QubitId(0), QubitId(1)], 2000, counts);
        let estimate = CorrelationEstimator::new(QubitRoles::default(), ErrorModel::Binomial)
            .estimate(&table)
            .unwrap();
        assert_eq!(estimate.value, 0.5);

        let mut at_floor = point(45.0, 0.0, 0.2, 0.2);
        at_floor.standard.estimate = estimate;
        let result = sweep(vec![at_floor, point(90.0, 0.5000001, 0.0, 0.0)]);
        let analysis = SignificanceAnalyzer::new(0.5, 2.0).analyze(&result).unwrap();

        assert_eq!(analysis.hardware.flagged, 1);
        let warning = analysis.warnings().next().unwrap();
        assert_eq!(warning.angle, Angle::from_degrees(45.0));
        assert_eq!(warning.correlation, 0.5);
    }

    #[test]
    fn test_restoration_failure_per_angle() {
        let result = sweep(vec![
            point(0.0, 0.84, 0.84, 0.83),
            point(90.0, 0.84, 0.0, 0.0),
            point(180.0, 0.84, 0.84, 0.80),
        ]);
        let analysis = SignificanceAnalyzer::new(0.5, 2.0).analyze(&result).unwrap();
        let se2 = (2.0 / 2000f64).sqrt();

        let at = |d: f64| analysis.at(Angle::from_degrees(d)).unwrap();
        // 0.01 / 0.0316 ≈ 0.32σ
        assert!((at(0.0).restoration_failure.gap - 0.01).abs() < 1e-12);
        assert!(!at(0.0).restoration_failed);
        // 0.84 / 0.0316 ≈ 26.6σ
        assert!((at(90.0).restoration_failure.significance.unwrap() - 0.84 / se2).abs() < 1e-9);
        assert!(at(90.0).restoration_failed);
        // 0.04 / 0.0316 ≈ 1.26σ
        assert!(!at(180.0).restoration_failed);

        assert_eq!(analysis.restoration_failure.gap, at(90.0).restoration_failure);
        assert!(analysis.restoration_failure.confirmed);
    }

    #[test]
    fn test_confirmation_threshold_is_configurable() {
        // 0.2 / 0.0316 ≈ 6.3σ: confirmed at 5σ, not at 10σ.
        let result = sweep(vec![point(90.0, 0.7, 0.0, 0.5)]);
        let default = SignificanceAnalyzer::new(0.5, 2.0).analyze(&result).unwrap();
        assert!(default.restoration_failure.confirmed);
        assert!(default.per_angle[0].restoration_failed);

        let strict = SignificanceAnalyzer::new(0.5, 2.0)
            .with_confirmation(10.0)
            .analyze(&result)
            .unwrap();
        assert!(!strict.restoration_failure.confirmed);
        assert!(strict.per_angle[0].restoration_failed);
    }

    #[test]
    fn test_zero_error_gap_exceeds_any_threshold() {
        let exact = |value| CorrelationEstimate {
            value,
            standard_error: 0.0,
            shot_count: 10,
        };
        let gap = RestorationGap::between(&exact(1.0), &exact(0.8));
        assert!(gap.exceeds(100.0));
        assert!(!RestorationGap::between(&exact(1.0), &exact(1.0)).exceeds(0.0));
    }

    #[test]
    fn test_marker_erasure_carried_per_angle() {
        let mut erased = point(90.0, 0.9, 0.0, 0.1);
        erased.no_reversal.marker_p0 = Some(0.5);
        erased.with_reversal.marker_p0 = Some(0.97);
        let result = sweep(vec![erased, point(0.0, 0.9, 0.9, 0.9)]);
        let analysis = SignificanceAnalyzer::new(0.5, 2.0).analyze(&result).unwrap();

        assert_eq!(analysis.per_angle[0].marker_p0, Some(0.97));
        assert_eq!(analysis.per_angle[1].marker_p0, None);

        let json = serde_json::to_value(&analysis.per_angle[0]).unwrap();
        assert_eq!(json["marker_p0"], serde_json::json!(0.97));
    }

    #[test]
    fn test_empty_sweep_is_insufficient() {
        let err = SignificanceAnalyzer::new(0.5, 2.0)
            .analyze(&sweep(vec![]))
            .unwrap_err();
        assert!(matches!(err, ExperimentError::InsufficientData(_)));
    }
}
