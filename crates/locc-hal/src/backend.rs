//! Execution backends.
//!
//! A [`Backend`] accepts a circuit and a shot count and eventually hands
//! back a bitstring histogram. Implementations supply the job primitives
//! (`submit`, `status`, `result`, `cancel`); the provided
//! [`Backend::execute`] strings them together:
//!
//! ```text
//!   accepts_shots ─→ validate ─→ submit ─→ poll status ─→ result
//!                                   └──── deadline expires ─→ cancel
//! ```
//!
//! The histogram returned by `execute` always sums to the requested shots.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::{Instant, sleep, timeout_at};
use tracing::{debug, warn};

use locc_ir::Circuit;

use crate::capability::Capabilities;
use crate::error::{HalError, HalResult};
use crate::job::{JobId, JobStatus};
use crate::result::ExecutionResult;

/// Poll interval used by [`Backend::wait`].
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Configuration for a backend instance.
///
/// Backend-specific knobs (seed, noise, latency, register size) live in
/// `extra` and are read by the backend's [`BackendFactory`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Name of the backend.
    pub name: String,
    /// Backend-specific settings.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BackendConfig {
    /// Create a new backend configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// Add extra configuration.
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Read an unsigned integer from `extra`.
    ///
    /// Missing keys yield `None`; present keys of the wrong type are a
    /// configuration error.
    pub fn extra_u64(&self, key: &str) -> HalResult<Option<u64>> {
        match self.extra.get(key) {
            None => Ok(None),
            Some(value) => value.as_u64().map(Some).ok_or_else(|| {
                HalError::Configuration(format!("'{key}' must be a non-negative integer"))
            }),
        }
    }
}

/// Trait for execution backends.
///
/// # Contract
///
/// - `capabilities()` is synchronous and infallible; implementations cache
///   capabilities at construction time.
/// - `submit()` returns a `JobId` whose initial status is `Queued`.
/// - `result()` is only meaningful once `status()` reports `Completed`.
/// - Result bitstrings carry one character per measured qubit, lowest
///   qubit index first.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Get the capabilities of this backend.
    fn capabilities(&self) -> &Capabilities;

    /// Check backend availability.
    async fn availability(&self) -> HalResult<BackendAvailability>;

    /// Validate a circuit against backend constraints.
    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult>;

    /// Submit a circuit for execution.
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId>;

    /// Get the status of a job.
    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    /// Get the result of a completed job.
    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult>;

    /// Cancel a running job.
    async fn cancel(&self, job_id: &JobId) -> HalResult<()>;

    /// Wait for a job to reach a terminal state and return its result.
    ///
    /// Polls every [`POLL_INTERVAL`] with no deadline of its own; callers
    /// bound it with a timeout.
    async fn wait(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        loop {
            match self.status(job_id).await? {
                JobStatus::Completed => return self.result(job_id).await,
                JobStatus::Failed(msg) => return Err(HalError::JobFailed(msg)),
                JobStatus::Cancelled => return Err(HalError::JobCancelled),
                JobStatus::Queued | JobStatus::Running => sleep(POLL_INTERVAL).await,
            }
        }
    }

    /// Validate, submit and wait for a circuit, all within `timeout`.
    ///
    /// A job still pending at the deadline is cancelled and reported as
    /// [`HalError::Timeout`]. Results whose counts do not sum to `shots`
    /// are rejected as [`HalError::MalformedResponse`].
    async fn execute(
        &self,
        circuit: &Circuit,
        shots: u32,
        timeout: Duration,
    ) -> HalResult<ExecutionResult> {
        self.execute_observed(circuit, shots, timeout, &|_: &JobId| {})
            .await
    }

    /// [`Backend::execute`], calling `on_submit` with the job id as soon as
    /// the backend accepts the circuit.
    ///
    /// Callers that may drop the returned future use the id to cancel the
    /// job themselves.
    async fn execute_observed(
        &self,
        circuit: &Circuit,
        shots: u32,
        timeout: Duration,
        on_submit: &(dyn for<'j> Fn(&'j JobId) + Send + Sync),
    ) -> HalResult<ExecutionResult> {
        if !self.capabilities().accepts_shots(shots) {
            return Err(HalError::InvalidShots(format!(
                "{shots} (backend '{}' accepts 1..={})",
                self.name(),
                self.capabilities().max_shots
            )));
        }
        if let ValidationResult::Invalid { reasons } = self.validate(circuit).await? {
            return Err(HalError::InvalidCircuit(reasons.join("; ")));
        }

        let deadline = Instant::now() + timeout;
        let job_id = timeout_at(deadline, self.submit(circuit, shots))
            .await
            .map_err(|_| HalError::Timeout(format!("submission of '{}'", circuit.name())))??;
        debug!(job = %job_id, circuit = circuit.name(), shots, "submitted");
        on_submit(&job_id);

        let result = match timeout_at(deadline, self.wait(&job_id)).await {
            Ok(result) => result?,
            Err(_) => {
                if let Err(e) = self.cancel(&job_id).await {
                    warn!(job = %job_id, error = %e, "cancel after timeout failed");
                }
                return Err(HalError::Timeout(format!("job {job_id}")));
            }
        };

        if !result.is_complete() {
            return Err(HalError::MalformedResponse(format!(
                "job {job_id} returned {} outcomes for {shots} shots",
                result.counts.total()
            )));
        }
        Ok(result)
    }
}

/// Backend availability information.
#[derive(Debug, Clone)]
pub struct BackendAvailability {
    /// Whether the backend is currently accepting jobs.
    pub is_available: bool,
    /// Number of jobs currently in queue (if known).
    pub queue_depth: Option<u32>,
    /// Human-readable status message.
    pub status_message: Option<String>,
}

impl BackendAvailability {
    /// Availability of a backend with no queue.
    pub fn always_available() -> Self {
        Self {
            is_available: true,
            queue_depth: Some(0),
            status_message: None,
        }
    }
}

/// Result of circuit validation against backend constraints.
#[derive(Debug, Clone)]
pub enum ValidationResult {
    /// Circuit is valid and can be submitted directly.
    Valid,
    /// Circuit is invalid for this backend.
    Invalid {
        /// Reasons the circuit is invalid.
        reasons: Vec<String>,
    },
}

impl ValidationResult {
    /// Check if the circuit is valid.
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

/// Trait for creating backends from configuration.
pub trait BackendFactory: Backend + Sized {
    /// Create a backend from configuration.
    fn from_config(config: BackendConfig) -> HalResult<Self>;
}
