//! Angle sweep: build → execute → estimate for every (angle, condition).

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::{StreamExt, TryStreamExt, stream};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use locc_hal::{Backend, JobId};
use locc_ir::Circuit;

use crate::angle::Angle;
use crate::builder::{CircuitBuilder, ConditionKind};
use crate::config::{ExperimentConfig, SweepMode};
use crate::error::{ExperimentError, ExperimentResult};
use crate::estimator::{CorrelationEstimate, CorrelationEstimator, CountTable};

/// Measurement of one condition at one angle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionResult {
    /// Condition measured.
    pub kind: ConditionKind,
    /// Correlation estimate.
    pub estimate: CorrelationEstimate,
    /// Raw counts the estimate came from.
    pub counts: CountTable,
    /// Fraction of shots with the marker in 0, when the marker is measured.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub marker_p0: Option<f64>,
}

/// The three conditions measured at one angle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnglePoint {
    /// Coupling angle.
    pub angle: Angle,
    /// Bell pair alone.
    pub standard: ConditionResult,
    /// Rotation without erasure.
    pub no_reversal: ConditionResult,
    /// Rotation followed by erasure.
    pub with_reversal: ConditionResult,
}

impl AnglePoint {
    /// Result for a condition.
    pub fn condition(&self, kind: ConditionKind) -> &ConditionResult {
        match kind {
            ConditionKind::Standard => &self.standard,
            ConditionKind::NoReversal => &self.no_reversal,
            ConditionKind::WithReversal => &self.with_reversal,
        }
    }

    /// Iterate over conditions in sweep order.
    pub fn conditions(&self) -> impl Iterator<Item = &ConditionResult> {
        ConditionKind::ALL.into_iter().map(|kind| self.condition(kind))
    }
}

/// Complete result of a sweep, in angle order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    /// Shots per circuit.
    pub shots: u32,
    /// One entry per angle, in sweep order.
    pub points: Vec<AnglePoint>,
}

impl SweepResult {
    /// Angles in sweep order.
    pub fn angles(&self) -> impl Iterator<Item = Angle> + '_ {
        self.points.iter().map(|p| p.angle)
    }

    /// Look up the point for an angle.
    pub fn point(&self, angle: Angle) -> Option<&AnglePoint> {
        self.points.iter().find(|p| p.angle == angle)
    }
}

/// Progress notification emitted after each completed execution.
#[derive(Debug, Clone, Copy)]
pub struct SweepProgress {
    /// Executions finished so far.
    pub completed: usize,
    /// Executions in the whole sweep.
    pub total: usize,
    /// Angle of the execution that just finished.
    pub angle: Angle,
    /// Condition of the execution that just finished.
    pub kind: ConditionKind,
}

type ProgressFn<'a> = Box<dyn Fn(SweepProgress) + Send + Sync + 'a>;

/// One (angle, condition) execution.
struct Task {
    angle: Angle,
    kind: ConditionKind,
    circuit: Circuit,
}

/// Jobs accepted by the backend whose results have not been collected,
/// keyed by task index.
#[derive(Default)]
struct InFlight(Mutex<BTreeMap<usize, JobId>>);

impl InFlight {
    fn lock(&self) -> MutexGuard<'_, BTreeMap<usize, JobId>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert(&self, index: usize, job_id: JobId) {
        self.lock().insert(index, job_id);
    }

    fn remove(&self, index: usize) {
        self.lock().remove(&index);
    }

    fn drain(&self) -> Vec<JobId> {
        std::mem::take(&mut *self.lock()).into_values().collect()
    }
}

/// Drives a sweep against a backend.
pub struct SweepOrchestrator<'a, B: Backend + ?Sized> {
    backend: &'a B,
    builder: CircuitBuilder,
    estimator: CorrelationEstimator,
    mode: SweepMode,
    max_in_flight: usize,
    timeout: Duration,
    progress: Option<ProgressFn<'a>>,
}

impl<'a, B: Backend + ?Sized> SweepOrchestrator<'a, B> {
    /// Create an orchestrator. Invalid configurations are rejected here,
    /// before anything reaches the backend.
    pub fn new(config: &ExperimentConfig, backend: &'a B) -> ExperimentResult<Self> {
        config.validate()?;
        Ok(Self {
            backend,
            builder: CircuitBuilder::new(config)?,
            estimator: CorrelationEstimator::new(config.roles, config.error_model),
            mode: config.sweep_mode,
            max_in_flight: config.max_in_flight,
            timeout: config.timeout(),
            progress: None,
        })
    }

    /// Call `f` after every completed execution.
    #[must_use]
    pub fn with_progress(mut self, f: impl Fn(SweepProgress) + Send + Sync + 'a) -> Self {
        self.progress = Some(Box::new(f));
        self
    }

    /// Run the sweep over `angles` with `shots` per circuit.
    ///
    /// Any execution or estimation failure aborts the whole sweep. In
    /// concurrent mode the jobs still pending at that point are cancelled
    /// before the error is returned.
    #[instrument(skip(self, angles), fields(backend = self.backend.name(), angles = angles.len()))]
    pub async fn run_sweep(&self, angles: &[Angle], shots: u32) -> ExperimentResult<SweepResult> {
        if angles.is_empty() {
            return Err(ExperimentError::InvalidSweep("no angles to sweep".into()));
        }
        if shots == 0 {
            return Err(ExperimentError::InvalidSweep(
                "shots per circuit must be positive".into(),
            ));
        }

        let tasks = self.plan(angles)?;
        let total = tasks.len();
        let completed = AtomicUsize::new(0);
        let in_flight = InFlight::default();
        info!(
            "Sweeping {} angles ({} executions, {} shots each, {:?})",
            angles.len(),
            total,
            shots,
            self.mode
        );

        let results: Vec<ConditionResult> = match self.mode {
            SweepMode::Sequential => {
                let mut results = Vec::with_capacity(total);
                for (i, task) in tasks.iter().enumerate() {
                    results.push(
                        self.run_task(i, task, shots, &completed, total, &in_flight)
                            .await?,
                    );
                }
                results
            }
            SweepMode::Concurrent => {
                let (completed, in_flight_ref) = (&completed, &in_flight);
                // Completion order; the first error drops every pending execution.
                let collected = stream::iter(tasks.iter().enumerate())
                    .map(|(i, task)| async move {
                        self.run_task(i, task, shots, completed, total, in_flight_ref)
                            .await
                            .map(|r| (i, r))
                    })
                    .buffer_unordered(self.max_in_flight)
                    .try_collect::<Vec<_>>()
                    .await;
                let mut indexed = match collected {
                    Ok(indexed) => indexed,
                    Err(e) => {
                        self.cancel_abandoned(&in_flight).await;
                        return Err(e);
                    }
                };
                indexed.sort_unstable_by_key(|(i, _)| *i);
                indexed.into_iter().map(|(_, r)| r).collect()
            }
        };

        let mut results = results.into_iter();
        let mut points = Vec::with_capacity(angles.len());
        for &angle in angles {
            // plan() emits exactly three tasks per angle, in ConditionKind::ALL order.
            let (Some(standard), Some(no_reversal), Some(with_reversal)) =
                (results.next(), results.next(), results.next())
            else {
                return Err(ExperimentError::InvalidSweep(format!(
                    "missing results for {angle}"
                )));
            };
            points.push(AnglePoint {
                angle,
                standard,
                no_reversal,
                with_reversal,
            });
        }

        info!("Sweep complete");
        Ok(SweepResult { shots, points })
    }

    /// Run the sweep described by a configuration.
    pub async fn run(&self, config: &ExperimentConfig) -> ExperimentResult<SweepResult> {
        self.run_sweep(&config.angles, config.shots).await
    }

    /// Build every circuit up front so configuration errors surface before
    /// the first execution.
    fn plan(&self, angles: &[Angle]) -> ExperimentResult<Vec<Task>> {
        let mut tasks = Vec::with_capacity(angles.len() * ConditionKind::ALL.len());
        for &angle in angles {
            for kind in ConditionKind::ALL {
                tasks.push(Task {
                    angle,
                    kind,
                    circuit: self.builder.build_condition(kind, angle)?,
                });
            }
        }
        Ok(tasks)
    }

    /// Cancel jobs whose executions were dropped mid-flight.
    async fn cancel_abandoned(&self, in_flight: &InFlight) {
        for job_id in in_flight.drain() {
            match self.backend.cancel(&job_id).await {
                Ok(()) => info!(job = %job_id, "cancelled abandoned job"),
                Err(e) => warn!(job = %job_id, error = %e, "cancel of abandoned job failed"),
            }
        }
    }

    async fn run_task(
        &self,
        index: usize,
        task: &Task,
        shots: u32,
        completed: &AtomicUsize,
        total: usize,
        in_flight: &InFlight,
    ) -> ExperimentResult<ConditionResult> {
        debug!(angle = %task.angle, condition = %task.kind, "executing");
        let result = self
            .backend
            .execute_observed(&task.circuit, shots, self.timeout, &|job_id: &JobId| {
                in_flight.insert(index, job_id.clone());
            })
            .await;
        in_flight.remove(index);
        let result = result?;

        let counts = CountTable::new(task.circuit.measured().to_vec(), shots, result.counts);
        let estimate = self.estimator.estimate(&counts)?;
        let marker_p0 = self.estimator.marker_zero_fraction(&counts)?;
        debug!(
            angle = %task.angle,
            condition = %task.kind,
            "C = {:.4} ± {:.4}",
            estimate.value,
            estimate.standard_error
        );

        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(progress) = &self.progress {
            progress(SweepProgress {
                completed: done,
                total,
                angle: task.angle,
                kind: task.kind,
            });
        }

        Ok(ConditionResult {
            kind: task.kind,
            estimate,
            counts,
            marker_p0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use locc_adapter_sim::SimulatorBackend;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_ideal_sweep_keeps_bell_correlation() {
        let backend = SimulatorBackend::seeded(17);
        let config = ExperimentConfig::default();
        let orchestrator = SweepOrchestrator::new(&config, &backend).unwrap();

        let angles = [Angle::from_degrees(0.0), Angle::from_degrees(90.0)];
        let result = orchestrator.run_sweep(&angles, 400).await.unwrap();

        assert_eq!(result.points.len(), 2);
        assert_eq!(result.angles().collect::<Vec<_>>(), angles);
        for point in &result.points {
            // Z-basis Alice/Bob agreement is untouched by a rotation on the marker.
            for condition in point.conditions() {
                assert_eq!(condition.estimate.value, 1.0);
                assert_eq!(condition.estimate.shot_count, 400);
            }
            assert!(point.standard.marker_p0.is_none());
        }
        // Reversal restores the marker to |0⟩.
        let p90 = result.point(Angle::from_degrees(90.0)).unwrap();
        assert_eq!(p90.with_reversal.marker_p0, Some(1.0));
    }

    #[tokio::test]
    async fn test_empty_sweep_rejected() {
        let backend = SimulatorBackend::seeded(1);
        let orchestrator = SweepOrchestrator::new(&ExperimentConfig::default(), &backend).unwrap();

        assert!(matches!(
            orchestrator.run_sweep(&[], 100).await,
            Err(ExperimentError::InvalidSweep(_))
        ));
        assert!(matches!(
            orchestrator
                .run_sweep(&[Angle::from_degrees(0.0)], 0)
                .await,
            Err(ExperimentError::InvalidSweep(_))
        ));
    }

    #[tokio::test]
    async fn test_progress_reports_every_execution() {
        let backend = SimulatorBackend::seeded(2);
        let config = ExperimentConfig {
            sweep_mode: SweepMode::Concurrent,
            max_in_flight: 2,
            ..ExperimentConfig::default()
        };
        let seen = Mutex::new(Vec::new());
        let orchestrator = SweepOrchestrator::new(&config, &backend)
            .unwrap()
            .with_progress(|p| seen.lock().unwrap().push(p.completed));

        let angles = [Angle::from_degrees(30.0), Angle::from_degrees(150.0)];
        orchestrator.run_sweep(&angles, 50).await.unwrap();
        drop(orchestrator);

        let mut seen = seen.into_inner().unwrap();
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2, 3, 4, 5, 6]);
    }
}
