//! Scenario identity: naming and output folder resolution.

use std::path::{Path, PathBuf};

/// What a scenario namer is called with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioKey<'a> {
    /// Batch mode: position of the scenario in the run.
    Index(usize),
    /// Single-scenario mode: identifier assigned by the caller.
    Id(&'a str),
}

/// Turns a [`ScenarioKey`] into a scenario name.
pub type ScenarioNamer<'a> = dyn Fn(ScenarioKey<'_>) -> String + 'a;

/// Namer producing `"{prefix}_{index}"` in batch mode and the identifier
/// itself in single-scenario mode.
pub fn prefixed_namer(prefix: String) -> impl Fn(ScenarioKey<'_>) -> String {
    move |key| match key {
        ScenarioKey::Index(i) => format!("{prefix}_{i}"),
        ScenarioKey::Id(id) => id.to_string(),
    }
}

/// Resolved name and output folder of one scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioIdentity {
    pub index: usize,
    pub name: String,
    pub path: PathBuf,
}

impl ScenarioIdentity {
    /// Names scenario `index` by index in batch mode, or by `scenario_id`
    /// when one was given.
    pub fn resolve(
        index: usize,
        scenario_id: Option<&str>,
        namer: &ScenarioNamer<'_>,
        output_folder: &Path,
    ) -> Self {
        let name = match scenario_id {
            Some(id) => namer(ScenarioKey::Id(id)),
            None => namer(ScenarioKey::Index(index)),
        };
        let path = output_folder.join(&name);
        Self { index, name, path }
    }
}
