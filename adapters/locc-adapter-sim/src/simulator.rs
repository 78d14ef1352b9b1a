//! Simulator backend implementation.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, instrument};
use uuid::Uuid;

use locc_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities, Counts,
    ExecutionResult, HalError, HalResult, Job, JobId, JobStatus, ValidationResult,
};
use locc_ir::Circuit;

use crate::statevector::{Statevector, outcome_to_bitstring};

const DEFAULT_MAX_QUBITS: u32 = 20;

/// Job data for the simulator.
struct SimJob {
    job: Job,
    /// Instant at which the job reports `Completed`.
    ready_at: Instant,
    result: ExecutionResult,
}

/// Local simulator backend.
///
/// Circuits are simulated exactly once per job; shots are then sampled
/// from the final measurement distribution. An optional symmetric readout
/// error flips each measured bit independently, and an optional latency
/// keeps jobs `Running` for a fixed time after submission.
pub struct SimulatorBackend {
    /// Backend configuration.
    config: BackendConfig,
    /// Cached capabilities.
    capabilities: Capabilities,
    /// Jobs whose result has not been collected yet.
    jobs: Arc<Mutex<FxHashMap<String, SimJob>>>,
    /// Sampling RNG, seeded when reproducible runs are requested.
    rng: Mutex<StdRng>,
    /// Per-bit readout flip probability.
    readout_error: f64,
    /// Time a job stays pending after submission.
    latency: Duration,
}

impl SimulatorBackend {
    /// Create a new simulator backend with default settings.
    pub fn new() -> Self {
        Self::build(
            BackendConfig::new("simulator"),
            DEFAULT_MAX_QUBITS,
            StdRng::from_entropy(),
        )
    }

    /// Create a simulator whose sampling is reproducible.
    pub fn seeded(seed: u64) -> Self {
        Self::build(
            BackendConfig::new("simulator"),
            DEFAULT_MAX_QUBITS,
            StdRng::seed_from_u64(seed),
        )
    }

    /// Flip each measured bit with probability `p`.
    #[must_use]
    pub fn with_readout_error(mut self, p: f64) -> Self {
        self.readout_error = p.clamp(0.0, 1.0);
        self
    }

    /// Keep jobs pending for `latency` after submission.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn build(config: BackendConfig, max_qubits: u32, rng: StdRng) -> Self {
        let mut capabilities = Capabilities::simulator(max_qubits);
        capabilities.name.clone_from(&config.name);
        Self {
            config,
            capabilities,
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
            rng: Mutex::new(rng),
            readout_error: 0.0,
            latency: Duration::ZERO,
        }
    }

    fn lock_jobs(&self) -> std::sync::MutexGuard<'_, FxHashMap<String, SimJob>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run simulation synchronously.
    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    fn run_simulation(&self, circuit: &Circuit, shots: u32) -> ExecutionResult {
        let start = std::time::Instant::now();

        let mut sv = Statevector::new(circuit.num_qubits());
        sv.apply_circuit(circuit);
        let probabilities = sv.probabilities();
        let measured: Vec<usize> = circuit.measured().iter().map(|q| q.index()).collect();

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let mut counts = Counts::new();
        for _ in 0..shots {
            let mut outcome = Statevector::sample(&probabilities, &mut *rng);
            if self.readout_error > 0.0 {
                for &q in &measured {
                    if rng.gen_bool(self.readout_error) {
                        outcome ^= 1 << q;
                    }
                }
            }
            counts.insert(outcome_to_bitstring(outcome, &measured), 1);
        }

        let elapsed = start.elapsed();
        debug!(
            "Simulated {} ops, {} shots in {:?}",
            circuit.ops().len(),
            shots,
            elapsed
        );

        ExecutionResult::new(counts, shots).with_execution_time(elapsed.as_millis() as u64)
    }
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.config.name
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

    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        if circuit.num_qubits() > self.capabilities.num_qubits as usize {
            return Err(HalError::CircuitTooLarge(format!(
                "Circuit has {} qubits but simulator only supports {}",
                circuit.num_qubits(),
                self.capabilities.num_qubits
            )));
        }
        if shots == 0 {
            return Err(HalError::InvalidShots("0".into()));
        }

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let result = self.run_simulation(circuit, shots);

        let mut job = Job::new(job_id.clone(), shots, self.name());
        job.transition(JobStatus::Running);
        self.lock_jobs().insert(
            job_id.0.clone(),
            SimJob {
                job,
                ready_at: Instant::now() + self.latency,
                result,
            },
        );

        debug!("Submitted job: {}", job_id);
        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let mut jobs = self.lock_jobs();
        let sim_job = jobs
            .get_mut(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        if Instant::now() >= sim_job.ready_at {
            sim_job.job.transition(JobStatus::Completed);
        }
        Ok(sim_job.job.status.clone())
    }

    /// Hands the histogram over and forgets the job.
    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let mut jobs = self.lock_jobs();
        let sim_job = jobs
            .get(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        match &sim_job.job.status {
            JobStatus::Completed => {}
            JobStatus::Cancelled => return Err(HalError::JobCancelled),
            other => {
                return Err(HalError::Backend(format!(
                    "result requested for job {job_id} in state {other}"
                )));
            }
        }
        jobs.remove(&job_id.0)
            .map(|sim_job| sim_job.result)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    /// Cancelled jobs are dropped; later lookups report `JobNotFound`.
    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        let mut sim_job = self
            .lock_jobs()
            .remove(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        sim_job.job.transition(JobStatus::Cancelled);
        debug!(job = %job_id, status = %sim_job.job.status, "dropped");
        Ok(())
    }
}

impl BackendFactory for SimulatorBackend {
    /// Recognised extras: `max_qubits`, `seed`, `latency_ms` (integers) and
    /// `readout_error` (float in `[0, 1]`).
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let max_qubits = match config.extra_u64("max_qubits")? {
            None => DEFAULT_MAX_QUBITS,
            Some(v) => u32::try_from(v).map_err(|_| {
                HalError::Configuration(format!("'max_qubits' {v} does not fit in 32 bits"))
            })?,
        };
        let rng = match config.extra_u64("seed")? {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let latency = Duration::from_millis(config.extra_u64("latency_ms")?.unwrap_or(0));
        let readout_error = match config.extra.get("readout_error") {
            None => 0.0,
            Some(v) => v
                .as_f64()
                .filter(|p| (0.0..=1.0).contains(p))
                .ok_or_else(|| {
                    HalError::Configuration("'readout_error' must be a number in [0, 1]".into())
                })?,
        };

        Ok(Self::build(config, max_qubits, rng)
            .with_readout_error(readout_error)
            .with_latency(latency))
    }
}
