//! Scripted backend for driving the sweep with known counts.
//!
//! Counts are produced by a closure from the submitted circuit, so tests can
//! dictate the correlation each condition reports without simulating it.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use locc_hal::{
    Backend, BackendAvailability, Capabilities, Counts, ExecutionResult, HalError, HalResult,
    JobId, JobStatus, ValidationResult,
};
use locc_ir::Circuit;

type Script = Box<dyn Fn(&Circuit, u32) -> HalResult<Option<Counts>> + Send + Sync>;

struct ScriptedJob {
    status: JobStatus,
    shots: u32,
    counts: Option<Counts>,
}

/// Backend whose outcome for each circuit is decided by a script.
///
/// The script returns `Ok(Some(counts))` to complete, `Ok(None)` to leave
/// the job running forever, or `Err` to fail the submission.
pub struct ScriptedBackend {
    script: Script,
    capabilities: Capabilities,
    jobs: Mutex<HashMap<String, ScriptedJob>>,
    submitted: AtomicUsize,
    cancelled: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(
        script: impl Fn(&Circuit, u32) -> HalResult<Option<Counts>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            script: Box::new(script),
            capabilities: Capabilities::simulator(5),
            jobs: Mutex::new(HashMap::new()),
            submitted: AtomicUsize::new(0),
            cancelled: AtomicUsize::new(0),
        }
    }

    /// Number of submissions accepted so far.
    pub fn submitted(&self) -> usize {
        self.submitted.load(Ordering::SeqCst)
    }

    /// Number of cancel calls received.
    pub fn cancelled(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Number of jobs still reporting `Running`.
    pub fn running(&self) -> usize {
        self.jobs
            .lock()
            .unwrap()
            .values()
            .filter(|j| j.status == JobStatus::Running)
            .count()
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "scripted"
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        Ok(self.capabilities.check(circuit))
    }

    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        let counts = (self.script)(circuit, shots)?;
        let id = self.submitted.fetch_add(1, Ordering::SeqCst);
        let job_id = JobId::new(format!("scripted-{id}"));
        let status = if counts.is_some() {
            JobStatus::Completed
        } else {
            JobStatus::Running
        };
        self.jobs.lock().unwrap().insert(
            job_id.0.clone(),
            ScriptedJob {
                status,
                shots,
                counts,
            },
        );
        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        self.jobs
            .lock()
            .unwrap()
            .get(&job_id.0)
            .map(|j| j.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let jobs = self.jobs.lock().unwrap();
        let job = jobs
            .get(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        let counts = job
            .counts
            .clone()
            .ok_or_else(|| HalError::Backend("job has no result".into()))?;
        Ok(ExecutionResult::new(counts, job.shots))
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        self.cancelled.fetch_add(1, Ordering::SeqCst);
        if let Some(job) = self.jobs.lock().unwrap().get_mut(&job_id.0) {
            job.status = JobStatus::Cancelled;
        }
        Ok(())
    }
}

/// Angle in degrees encoded in a condition circuit's name, if any.
pub fn angle_of(circuit: &Circuit) -> Option<f64> {
    circuit.name().rsplit('_').next()?.parse().ok()
}

/// Counts over the circuit's measured qubits whose Alice–Bob correlation is
/// `c` (rounded to whole shots). Alice and Bob are the first two bits; any
/// further bits stay 0.
pub fn counts_with_correlation(c: f64, shots: u32, width: usize) -> Counts {
    let same = (f64::from(shots) * (1.0 + c) / 2.0).round() as u64;
    let diff = u64::from(shots) - same;
    let pad = "0".repeat(width - 2);
    let mut counts = Counts::new();
    for (bits, n) in [
        ("00", same - same / 2),
        ("11", same / 2),
        ("01", diff - diff / 2),
        ("10", diff / 2),
    ] {
        if n > 0 {
            counts.insert(format!("{bits}{pad}"), n);
        }
    }
    counts
}
