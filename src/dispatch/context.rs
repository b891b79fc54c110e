//! The dispatcher: shared grid environment plus the current scenario.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::grid::GridTopology;
use crate::chronics::{TableError, TimeSeriesTable};
use crate::params::GenerationParameters;

/// Renewable energy source kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RenewableKind {
    Solar,
    Wind,
}

impl fmt::Display for RenewableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenewableKind::Solar => f.write_str("solar"),
            RenewableKind::Wind => f.write_str("wind"),
        }
    }
}

/// Scenario-independent dispatch state, built once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchEnvironment {
    pub grid: GridTopology,
    pub opf_params: GenerationParameters,
}

/// Grid-independent chronics of one scenario, as seen by the dispatch stage.
///
/// Built in one go by [`ScenarioContext::new`]; there are no setters, so a
/// context can only be swapped as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioContext {
    name: String,
    load: TimeSeriesTable,
    prods: TimeSeriesTable,
    res_names: BTreeMap<RenewableKind, Vec<String>>,
    loss: Option<TimeSeriesTable>,
}

impl ScenarioContext {
    /// Combines solar and wind production (solar columns first) and records
    /// which columns belong to which kind.
    ///
    /// # Errors
    ///
    /// Fails if a column name appears in both renewable tables, or if the
    /// renewable or loss indices differ from the load index.
    pub fn new(
        name: impl Into<String>,
        load: TimeSeriesTable,
        solar: &TimeSeriesTable,
        wind: &TimeSeriesTable,
        loss: Option<TimeSeriesTable>,
    ) -> Result<Self, TableError> {
        let prods = solar.concat_columns(wind, "prods")?;
        aligned(&load, &prods)?;
        if let Some(loss) = &loss {
            aligned(&load, loss)?;
        }
        let res_names = BTreeMap::from([
            (RenewableKind::Wind, wind.columns().to_vec()),
            (RenewableKind::Solar, solar.columns().to_vec()),
        ]);
        Ok(Self {
            name: name.into(),
            load,
            prods,
            res_names,
            loss,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn load(&self) -> &TimeSeriesTable {
        &self.load
    }

    /// Combined renewable production.
    pub fn prods(&self) -> &TimeSeriesTable {
        &self.prods
    }

    /// Columns of [`prods`](Self::prods) for each renewable kind.
    pub fn res_names(&self) -> &BTreeMap<RenewableKind, Vec<String>> {
        &self.res_names
    }

    pub fn loss(&self) -> Option<&TimeSeriesTable> {
        self.loss.as_ref()
    }
}

/// Dispatch state handed to the dispatch backend.
///
/// The environment is fixed at construction and shared behind an `Arc`.
/// The scenario context is replaced wholesale before every dispatch.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    env: Arc<DispatchEnvironment>,
    scenario: Option<ScenarioContext>,
}

impl Dispatcher {
    pub fn new(env: Arc<DispatchEnvironment>) -> Self {
        Self {
            env,
            scenario: None,
        }
    }

    pub fn environment(&self) -> &DispatchEnvironment {
        &self.env
    }

    pub fn grid(&self) -> &GridTopology {
        &self.env.grid
    }

    pub fn opf_params(&self) -> &GenerationParameters {
        &self.env.opf_params
    }

    /// Current scenario, if one has been installed.
    pub fn scenario(&self) -> Option<&ScenarioContext> {
        self.scenario.as_ref()
    }

    /// Installs `next` and returns the context it replaces.
    pub fn replace_scenario(&mut self, next: ScenarioContext) -> Option<ScenarioContext> {
        self.scenario.replace(next)
    }

}

fn aligned(load: &TimeSeriesTable, other: &TimeSeriesTable) -> Result<(), TableError> {
    if load.index() != other.index() {
        return Err(TableError::IndexMismatch {
            left: load.name().to_string(),
            right: other.name().to_string(),
        });
    }
    Ok(())
}
