//! LOCC Local Statevector Simulator
//!
//! An exact statevector simulator over the experiment's gate set
//! (`H`, `Rx`, `Ry`, `Rz`, `CX`) exposed as a [`locc_hal::Backend`].
//! The final state is computed once per job and shots are sampled from its
//! measurement distribution, so cost grows with 2^n rather than with shots.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use locc_adapter_sim::SimulatorBackend;
//! use locc_hal::Backend;
//! use locc_ir::Circuit;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = SimulatorBackend::seeded(7);
//!     let circuit = Circuit::bell()?;
//!     let result = backend
//!         .execute(&circuit, 1000, Duration::from_secs(10))
//!         .await?;
//!
//!     // Expect ~50% |00⟩ and ~50% |11⟩
//!     println!("Results: {:?}", result.counts);
//!     Ok(())
//! }
//! ```

mod simulator;
mod statevector;

pub use simulator::SimulatorBackend;
pub use statevector::{Statevector, outcome_to_bitstring};
