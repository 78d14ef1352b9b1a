//! Backend failures.
//!
//! Variants follow the life of one execution: the request is checked
//! against the backend, submitted, polled, and its histogram collected.

use thiserror::Error;

/// Why an execution did not produce a usable histogram.
///
/// Callers treat every variant as a backend error and do not retry.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// Backend settings could not be interpreted.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Shot count outside the range the backend accepts.
    #[error("Invalid shots: {0}")]
    InvalidShots(String),

    /// Circuit uses a gate the backend does not run or lacks measurements.
    #[error("Invalid circuit: {0}")]
    InvalidCircuit(String),

    /// Circuit addresses more qubits than the backend has.
    #[error("Circuit exceeds backend capabilities: {0}")]
    CircuitTooLarge(String),

    /// The backend refused the job.
    #[error("Job submission failed: {0}")]
    SubmissionFailed(String),

    /// No job with this id is known to the backend.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// The job ran and the device reported failure.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// The job was cancelled before it completed.
    #[error("Job cancelled")]
    JobCancelled,

    /// The deadline passed before the job reached a terminal state.
    #[error("Timeout waiting for {0}")]
    Timeout(String),

    /// Counts that cannot belong to the requested execution.
    #[error("Malformed device response: {0}")]
    MalformedResponse(String),

    /// Any other backend-side failure.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;
