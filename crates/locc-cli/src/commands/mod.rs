//! CLI command implementations.

pub mod analyze;
pub mod circuits;
pub mod common;
pub mod run;
pub mod version;
