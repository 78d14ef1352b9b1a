//! LOCC quantum-erasure experiment.
//!
//! A Bell pair is shared between Alice and Bob. A controlled rotation from
//! Alice onto a marker qubit records which-path information; reversing it
//! erases that record. Sweeping the rotation angle and comparing the
//! Alice–Bob correlation with and without erasure tests whether local
//! operations restore what the coupling destroyed.
//!
//! # Pipeline
//!
//! ```text
//!   CircuitBuilder ──→ Backend::execute ──→ CorrelationEstimator
//!   (per angle × condition)                        │
//!                                                  ▼
//!                      SignificanceAnalyzer ←── SweepResult
//! ```
//!
//! # Example
//!
//! ```ignore
//! use locc_adapter_sim::SimulatorBackend;
//! use locc_experiment::{ExperimentConfig, SignificanceAnalyzer, SweepOrchestrator};
//!
//! let config = ExperimentConfig::default();
//! let backend = SimulatorBackend::seeded(7);
//! let result = SweepOrchestrator::new(&config, &backend)?
//!     .run(&config)
//!     .await?;
//! let analysis = SignificanceAnalyzer::from_config(&config).analyze(&result)?;
//! println!("reference angle: {}", analysis.reference.angle);
//! ```

pub mod analysis;
pub mod angle;
pub mod builder;
pub mod config;
pub mod decompose;
pub mod error;
pub mod estimator;
pub mod record;
pub mod sweep;

pub use analysis::{
    Analysis, AngleAnalysis, HardwareSummary, ReferenceSummary, RestorationFailure,
    RestorationGap, SignificanceAnalyzer, normal_cdf, two_sided_p_value,
};
pub use angle::Angle;
pub use builder::{CircuitBuilder, ConditionKind};
pub use config::{DEFAULT_DEVICE, ExperimentConfig, QubitRoles, SweepMode};
pub use decompose::{DECOMPOSITION_LEN, GateDecomposer};
pub use error::{ExperimentError, ExperimentResult, HardwareQualityWarning};
pub use estimator::{CorrelationEstimate, CorrelationEstimator, CountTable, ErrorModel};
pub use record::{RecordMetadata, SweepRecord};
pub use sweep::{AnglePoint, ConditionResult, SweepOrchestrator, SweepProgress, SweepResult};
