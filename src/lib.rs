//! Scenario chronics generation for power grid studies.
//!
//! A run produces, for each scenario, time series of loads, renewable
//! production, network losses and economic dispatch from a case folder of
//! parameter files.

pub mod chronics;
pub mod cli;
pub mod config;
pub mod config_manager;
pub mod dispatch;
pub mod error;
pub mod forecast;
/// Orchestrator, mode parsing and scenario naming.
pub mod generator;
pub mod io;
pub mod params;
pub mod reporting;
pub mod seeds;
/// Stage backend traits and reference implementations.
pub mod stages;

pub use error::{GenerationError, Result, StageError};
pub use generator::{ChronicsGenerator, RunReport, RunRequest};
