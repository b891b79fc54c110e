//! Stage backends: the pluggable generators behind each mode letter.
//!
//! The orchestrator only sees the four traits below. Reference
//! implementations live in the submodules and are selected by name through
//! [`BackendRegistry`].

pub mod dispatch;
pub mod load;
pub mod loss;
pub mod noise;
pub mod registry;
pub mod renewable;

use std::path::Path;

use crate::chronics::{CharacteristicsTable, TimeSeriesTable};
use crate::config_manager::ConfigManager;
use crate::dispatch::Dispatcher;
use crate::error::StageError;
use crate::params::GenerationParameters;

pub use registry::BackendRegistry;

/// File names of the tables persisted in a scenario directory.
pub mod outputs {
    pub const LOAD: &str = "load_p.csv";
    pub const LOAD_FORECASTED: &str = "load_p_forecasted.csv";
    pub const SOLAR: &str = "solar_p.csv";
    pub const SOLAR_FORECASTED: &str = "solar_p_forecasted.csv";
    pub const WIND: &str = "wind_p.csv";
    pub const WIND_FORECASTED: &str = "wind_p_forecasted.csv";
    pub const LOSS: &str = "loss.csv";
    pub const PRODUCTION: &str = "prod_p.csv";
    pub const PRODUCTION_FORECASTED: &str = "prod_p_forecasted.csv";
    pub const SLACK: &str = "slack.csv";
}

/// Input of a load generation run.
#[derive(Debug, Clone, Copy)]
pub struct LoadRequest<'a> {
    /// Scenario directory the backend writes to.
    pub path: &'a Path,
    pub seed: Option<u64>,
    /// Load parameters merged with the global ones.
    pub params: &'a GenerationParameters,
    pub characteristics: &'a CharacteristicsTable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutput {
    pub load: TimeSeriesTable,
    pub load_forecasted: TimeSeriesTable,
}

/// Input of a renewable generation run.
#[derive(Debug, Clone, Copy)]
pub struct RenewableRequest<'a> {
    pub path: &'a Path,
    pub seed: Option<u64>,
    pub params: &'a GenerationParameters,
    pub characteristics: &'a CharacteristicsTable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenewableOutput {
    pub solar: TimeSeriesTable,
    pub solar_forecasted: TimeSeriesTable,
    pub wind: TimeSeriesTable,
    pub wind_forecasted: TimeSeriesTable,
}

/// Input of a loss generation run.
///
/// The loss stage reads its own parameters through `config_manager`, which
/// the orchestrator builds fresh for every scenario.
#[derive(Clone, Copy)]
pub struct LossRequest<'a> {
    /// Root folder of the input cases.
    pub input_folder: &'a Path,
    pub path: &'a Path,
    pub load: &'a TimeSeriesTable,
    pub solar: &'a TimeSeriesTable,
    pub wind: &'a TimeSeriesTable,
    /// Global parameters.
    pub params: &'a GenerationParameters,
    pub config_manager: &'a dyn ConfigManager,
}

/// Input of a dispatch run. The scenario chronics are read from
/// `dispatcher.scenario()`.
#[derive(Debug, Clone, Copy)]
pub struct DispatchRequest<'a> {
    pub dispatcher: &'a Dispatcher,
    /// Scenario directory holding the upstream chronics.
    pub input_path: &'a Path,
    /// Scenario directory the backend writes to.
    pub output_path: &'a Path,
    /// Folder holding the grid description.
    pub grid_folder: &'a Path,
    pub seed: Option<u64>,
    /// Global parameters.
    pub params: &'a GenerationParameters,
    /// Optimization parameters merged with the global ones.
    pub opf_params: &'a GenerationParameters,
}

/// Outcome of a dispatch run.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchResult {
    /// Dispatchable production, one column per generator.
    pub production: TimeSeriesTable,
    pub production_forecasted: TimeSeriesTable,
    /// Residual demand left unserved (positive) or in excess (negative).
    pub slack: TimeSeriesTable,
}

pub trait LoadBackend {
    fn run(&mut self, request: LoadRequest<'_>) -> Result<LoadOutput, StageError>;
}

pub trait RenewableBackend {
    fn run(&mut self, request: RenewableRequest<'_>) -> Result<RenewableOutput, StageError>;
}

pub trait LossBackend {
    fn run(&mut self, request: LossRequest<'_>) -> Result<TimeSeriesTable, StageError>;
}

pub trait DispatchBackend {
    fn run(&mut self, request: DispatchRequest<'_>) -> Result<DispatchResult, StageError>;
}

/// Capacities (`Pmax` column) of `names`, in order.
pub(crate) fn capacities(
    characteristics: &CharacteristicsTable,
    names: &[&str],
) -> Result<Vec<f64>, StageError> {
    names
        .iter()
        .map(|name| characteristics.f64(name, PMAX_COLUMN).map_err(StageError::from))
        .collect()
}

/// Characteristics column holding the installed capacity.
pub const PMAX_COLUMN: &str = "Pmax";
/// Characteristics column holding the generator type.
pub const TYPE_COLUMN: &str = "type";
