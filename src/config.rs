//! TOML-based run configuration.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::generator::engine::RunRequest;
use crate::generator::mode::{DEFAULT_MODE, Mode};
use crate::params::{DATETIME_FORMAT, GenerationParameters};
use crate::seeds::SeedTriple;
use crate::stages::registry::{
    DISPATCH_BACKENDS, LOAD_BACKENDS, LOSS_BACKENDS, RENEWABLE_BACKENDS,
};

/// Top-level run configuration parsed from TOML.
///
/// Every section has defaults. Load from TOML with
/// [`RunConfig::from_toml_file`] or start from [`RunConfig::baseline`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// What to generate and where.
    #[serde(default)]
    pub run: RunSection,
    /// Time horizon overrides applied onto the global parameters.
    #[serde(default)]
    pub time: TimeSection,
    /// Backend selected for each stage.
    #[serde(default)]
    pub backends: BackendsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunSection {
    /// Case folder name under the input folder.
    pub case: String,
    /// Folder holding the case folders.
    pub input_folder: PathBuf,
    /// Folder receiving one directory per scenario.
    pub output_folder: PathBuf,
    /// Number of scenarios (must be > 0).
    pub n_scenarios: usize,
    /// Stage letters: `L`oad, `R`enewable, loss (`D`), dispatch (`T`), `K` (hydro, ignored).
    pub mode: String,
    /// Explicit scenario name, only valid with a single scenario.
    pub scenario_id: Option<String>,
    /// Prefix of batch scenario names (`"{prefix}_{index}"`).
    pub scenario_prefix: String,
    pub seed_for_loads: Option<u64>,
    pub seed_for_res: Option<u64>,
    pub seed_for_disp: Option<u64>,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            case: "case118".to_string(),
            input_folder: PathBuf::from("input"),
            output_folder: PathBuf::from("output"),
            n_scenarios: 1,
            mode: DEFAULT_MODE.to_string(),
            scenario_id: None,
            scenario_prefix: "Scenario".to_string(),
            seed_for_loads: None,
            seed_for_res: None,
            seed_for_disp: None,
        }
    }
}

/// Time overrides. Unset fields keep the value of `params.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeSection {
    /// `YYYY-MM-DD HH:MM`.
    pub start_date: Option<String>,
    /// `YYYY-MM-DD HH:MM`.
    pub end_date: Option<String>,
    /// Step length in minutes.
    pub dt: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendsConfig {
    pub load: String,
    pub renewable: String,
    pub loss: String,
    pub dispatch: String,
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            load: "sinusoidal".to_string(),
            renewable: "ar1".to_string(),
            loss: "flat_rate".to_string(),
            dispatch: "merit_order".to_string(),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"run.n_scenarios"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

fn parse_date(field: &str, raw: &str, errors: &mut Vec<ConfigError>) -> Option<NaiveDateTime> {
    match NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT) {
        Ok(date) => Some(date),
        Err(e) => {
            errors.push(ConfigError {
                field: field.to_string(),
                message: format!("\"{raw}\" does not match {DATETIME_FORMAT}: {e}"),
            });
            None
        }
    }
}

fn check_backend(field: &str, name: &str, known: &[&str], errors: &mut Vec<ConfigError>) {
    if !known.contains(&name) {
        errors.push(ConfigError {
            field: format!("backends.{field}"),
            message: format!("unknown backend \"{name}\", available: {}", known.join(", ")),
        });
    }
}

impl RunConfig {
    /// Default configuration: one `case118` scenario in mode `LRTK` with
    /// the reference backends.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Parses a run configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a run configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let r = &self.run;

        if r.case.trim().is_empty() {
            errors.push(ConfigError {
                field: "run.case".into(),
                message: "must not be empty".into(),
            });
        }
        if r.n_scenarios == 0 {
            errors.push(ConfigError {
                field: "run.n_scenarios".into(),
                message: "must be > 0".into(),
            });
        }
        if r.scenario_id.is_some() && r.n_scenarios > 1 {
            errors.push(ConfigError {
                field: "run.scenario_id".into(),
                message: format!(
                    "requires run.n_scenarios = 1, got {}",
                    r.n_scenarios
                ),
            });
        }
        if let Err(e) = Mode::parse(&r.mode) {
            errors.push(ConfigError {
                field: "run.mode".into(),
                message: e.to_string(),
            });
        }

        let t = &self.time;
        if t.dt == Some(0) {
            errors.push(ConfigError {
                field: "time.dt".into(),
                message: "must be > 0".into(),
            });
        }
        let start = t
            .start_date
            .as_deref()
            .and_then(|s| parse_date("time.start_date", s, &mut errors));
        let end = t
            .end_date
            .as_deref()
            .and_then(|s| parse_date("time.end_date", s, &mut errors));
        if let (Some(start), Some(end)) = (start, end) {
            if end <= start {
                errors.push(ConfigError {
                    field: "time.end_date".into(),
                    message: "must be after time.start_date".into(),
                });
            }
        }

        let b = &self.backends;
        check_backend("load", &b.load, LOAD_BACKENDS, &mut errors);
        check_backend("renewable", &b.renewable, RENEWABLE_BACKENDS, &mut errors);
        check_backend("loss", &b.loss, LOSS_BACKENDS, &mut errors);
        check_backend("dispatch", &b.dispatch, DISPATCH_BACKENDS, &mut errors);

        errors
    }

    /// Time overrides as generation parameters.
    pub fn time_params(&self) -> GenerationParameters {
        let mut params = GenerationParameters::new();
        if let Some(start) = &self.time.start_date {
            params.insert("start_date", start.as_str());
        }
        if let Some(end) = &self.time.end_date {
            params.insert("end_date", end.as_str());
        }
        if let Some(dt) = self.time.dt {
            params.insert("dt", dt);
        }
        params
    }

    pub fn seeds(&self) -> SeedTriple {
        SeedTriple {
            load: self.run.seed_for_loads,
            res: self.run.seed_for_res,
            disp: self.run.seed_for_disp,
        }
    }

    /// Builds the request for a generation run.
    pub fn run_request(&self) -> RunRequest {
        let r = &self.run;
        let mut request = RunRequest::new(
            r.case.clone(),
            r.n_scenarios,
            r.input_folder.clone(),
            r.output_folder.clone(),
        )
        .with_mode(r.mode.clone())
        .with_scenario_prefix(r.scenario_prefix.clone())
        .with_time_params(self.time_params())
        .with_seeds(self.seeds());
        if let Some(id) = &r.scenario_id {
            request = request.with_scenario_id(id.clone());
        }
        request
    }
}
