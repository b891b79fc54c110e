//! Scenario generation: mode parsing, scenario naming and the orchestrator.

pub mod engine;
pub mod mode;
pub mod scenario;

pub use engine::{ChronicsGenerator, RunReport, RunRequest, ScenarioReport};
pub use mode::{DEFAULT_MODE, Mode, Stage};
pub use scenario::{ScenarioIdentity, ScenarioKey, prefixed_namer};
