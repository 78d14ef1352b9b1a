//! LOCC Hardware Abstraction Layer
//!
//! This crate provides a uniform interface for running measured circuits on
//! execution backends, whether a local simulator or a cloud device.
//!
//! # Overview
//!
//! - A common [`Backend`] trait for job submission and management
//! - [`Capabilities`] to describe qubit count, native gates and shot limits
//! - Unified result handling via [`ExecutionResult`] and [`Counts`]
//!
//! # Example: Running a Circuit
//!
//! ```ignore
//! use std::time::Duration;
//! use locc_hal::Backend;
//! use locc_adapter_sim::SimulatorBackend;
//! use locc_ir::Circuit;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let circuit = Circuit::bell()?;
//!     let backend = SimulatorBackend::new();
//!
//!     let result = backend
//!         .execute(&circuit, 1000, Duration::from_secs(30))
//!         .await?;
//!
//!     for (bitstring, count) in result.counts.iter() {
//!         println!("{bitstring}: {count}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod capability;
pub mod error;
pub mod job;
pub mod result;

pub use backend::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, POLL_INTERVAL, ValidationResult,
};
pub use capability::Capabilities;
pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobStatus};
pub use result::{Counts, ExecutionResult};
