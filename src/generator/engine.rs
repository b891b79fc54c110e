//! Scenario orchestration: configuration, seeds and the per-scenario stage
//! pipeline.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info};

use super::mode::{DEFAULT_MODE, Mode, Stage};
use super::scenario::{ScenarioIdentity, ScenarioKey, ScenarioNamer, prefixed_namer};
use crate::chronics::{CharacteristicsTable, TimeSeriesTable};
use crate::config_manager::{ConfigLayout, ConfigManager, Configuration, files};
use crate::dispatch::{DispatchEnvironment, Dispatcher, GridTopology, ScenarioContext};
use crate::error::{GenerationError, Result, StageError};
use crate::io::import::read_table;
use crate::params::GenerationParameters;
use crate::seeds::{SeedTriple, check_scenario, derive_seeds};
use crate::stages::{
    BackendRegistry, DispatchRequest, DispatchResult, LoadRequest, LossRequest, RenewableRequest,
    outputs,
};

/// Everything a generation run needs from its caller.
pub struct RunRequest {
    pub case: String,
    pub n_scenarios: usize,
    pub input_folder: PathBuf,
    pub output_folder: PathBuf,
    pub scenario_namer: Box<ScenarioNamer<'static>>,
    /// Overrides of `start_date`, `end_date` and `dt`.
    pub time_params: GenerationParameters,
    pub mode: String,
    pub scenario_id: Option<String>,
    pub seeds: SeedTriple,
}

impl RunRequest {
    /// Request for `n_scenarios` batch scenarios named `Scenario_{i}`, in
    /// the default mode, without time overrides or base seeds.
    pub fn new(
        case: impl Into<String>,
        n_scenarios: usize,
        input_folder: impl Into<PathBuf>,
        output_folder: impl Into<PathBuf>,
    ) -> Self {
        Self {
            case: case.into(),
            n_scenarios,
            input_folder: input_folder.into(),
            output_folder: output_folder.into(),
            scenario_namer: Box::new(prefixed_namer("Scenario".to_string())),
            time_params: GenerationParameters::new(),
            mode: DEFAULT_MODE.to_string(),
            scenario_id: None,
            seeds: SeedTriple::default(),
        }
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    pub fn with_scenario_id(mut self, id: impl Into<String>) -> Self {
        self.scenario_id = Some(id.into());
        self
    }

    pub fn with_seeds(mut self, seeds: SeedTriple) -> Self {
        self.seeds = seeds;
        self
    }

    pub fn with_time_params(mut self, time_params: GenerationParameters) -> Self {
        self.time_params = time_params;
        self
    }

    pub fn with_scenario_prefix(self, prefix: impl Into<String>) -> Self {
        self.with_namer(prefixed_namer(prefix.into()))
    }

    pub fn with_namer(mut self, namer: impl Fn(ScenarioKey<'_>) -> String + 'static) -> Self {
        self.scenario_namer = Box::new(namer);
        self
    }

    fn case_folder(&self) -> PathBuf {
        self.input_folder.join(&self.case)
    }
}

/// What happened to one scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioReport {
    pub identity: ScenarioIdentity,
    pub seeds: SeedTriple,
    pub stages: Vec<Stage>,
    pub dispatch: Option<DispatchResult>,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Global parameters after the time overrides.
    pub params: GenerationParameters,
    pub load_characteristics: CharacteristicsTable,
    pub renewable_characteristics: CharacteristicsTable,
    pub scenarios: Vec<ScenarioReport>,
}

/// Configurations read once per run.
struct RunInputs {
    global: GenerationParameters,
    load_params: GenerationParameters,
    load_charac: CharacteristicsTable,
    res_params: GenerationParameters,
    res_charac: CharacteristicsTable,
    opf_params: GenerationParameters,
}

/// Upstream tables of the scenario being generated, either computed in
/// this run or read back from the scenario directory.
#[derive(Default)]
struct Upstream {
    load: Option<TimeSeriesTable>,
    solar: Option<TimeSeriesTable>,
    wind: Option<TimeSeriesTable>,
}

impl Upstream {
    fn require(
        &mut self,
        stage: Stage,
        scenario: &ScenarioIdentity,
    ) -> Result<(&TimeSeriesTable, &TimeSeriesTable, &TimeSeriesTable)> {
        let load = persisted(&mut self.load, stage, scenario, outputs::LOAD)?;
        let solar = persisted(&mut self.solar, stage, scenario, outputs::SOLAR)?;
        let wind = persisted(&mut self.wind, stage, scenario, outputs::WIND)?;
        Ok((load, solar, wind))
    }
}

fn persisted<'t>(
    slot: &'t mut Option<TimeSeriesTable>,
    stage: Stage,
    scenario: &ScenarioIdentity,
    file: &str,
) -> Result<&'t TimeSeriesTable> {
    let table = match slot.take() {
        Some(table) => table,
        None => {
            let path = scenario.path.join(file);
            if !path.is_file() {
                return Err(GenerationError::MissingUpstream {
                    stage,
                    scenario: scenario.name.clone(),
                    path,
                });
            }
            debug!(
                scenario = %scenario.name,
                %stage,
                path = %path.display(),
                "reading persisted upstream table"
            );
            read_table(&path)?
        }
    };
    let table: &TimeSeriesTable = slot.insert(table);
    Ok(table)
}

fn stage_failure(stage: Stage, scenario: &ScenarioIdentity, source: StageError) -> GenerationError {
    error!(scenario = %scenario.name, %stage, error = %source, "stage failed");
    GenerationError::Stage {
        stage,
        scenario: scenario.name.clone(),
        source,
    }
}

fn split_characteristics(
    domain: &dyn ConfigManager,
    config: Configuration,
) -> Result<(GenerationParameters, CharacteristicsTable)> {
    match config.characteristics {
        Some(charac) => Ok((config.params, charac)),
        None => Err(GenerationError::configuration(
            domain.name(),
            "no characteristics table was read",
        )),
    }
}

/// Runs the generation pipeline over every requested scenario.
pub struct ChronicsGenerator {
    backends: BackendRegistry,
}

impl Default for ChronicsGenerator {
    fn default() -> Self {
        Self::new(BackendRegistry::default())
    }
}

impl ChronicsGenerator {
    pub fn new(backends: BackendRegistry) -> Self {
        Self { backends }
    }

    pub fn backends(&self) -> &BackendRegistry {
        &self.backends
    }

    /// Generates the chronics of every scenario of `request`.
    ///
    /// The mode and scenario count are checked before any file is touched.
    /// Configurations, seeds and the dispatch environment are prepared once,
    /// then scenarios run in increasing index order. The first stage
    /// failure aborts the run; outputs of earlier scenarios stay on disk.
    ///
    /// # Errors
    ///
    /// See [`GenerationError`].
    pub fn run(&mut self, request: RunRequest) -> Result<RunReport> {
        let mode = Mode::parse(&request.mode)?;
        let scenario_id = request.scenario_id.as_deref();
        check_scenario(request.n_scenarios, scenario_id)?;

        info!(
            case = %request.case,
            n_scenarios = request.n_scenarios,
            %mode,
            scenario_id = scenario_id.unwrap_or("-"),
            "starting chronics generation"
        );

        let seeds = derive_seeds(request.n_scenarios, request.seeds)?;
        debug!(load = ?seeds.load, res = ?seeds.res, disp = ?seeds.disp, "derived seeds");

        let inputs = self.read_inputs(&request)?;
        let case_folder = request.case_folder();

        let mut dispatcher = if mode.dispatch {
            let grid = GridTopology::from_json_file(&case_folder.join(files::GRID))?;
            let env = DispatchEnvironment {
                grid,
                opf_params: inputs.opf_params.clone(),
            };
            Some(Dispatcher::new(Arc::new(env)))
        } else {
            None
        };

        let mut scenarios = Vec::with_capacity(request.n_scenarios);
        for (i, triple) in seeds.triples().enumerate() {
            let identity = ScenarioIdentity::resolve(
                i,
                scenario_id,
                request.scenario_namer.as_ref(),
                &request.output_folder,
            );
            info!(scenario = %identity.name, path = %identity.path.display(), "generating scenario");
            fs::create_dir_all(&identity.path)
                .map_err(|e| GenerationError::io(&identity.path, e))?;

            let dispatch = self.run_scenario(
                &request,
                &case_folder,
                mode,
                &identity,
                triple,
                &inputs,
                dispatcher.as_mut(),
            )?;
            scenarios.push(ScenarioReport {
                identity,
                seeds: triple,
                stages: mode.stages(),
                dispatch,
            });
        }

        info!(scenarios = scenarios.len(), "chronics generation finished");
        Ok(RunReport {
            params: inputs.global,
            load_characteristics: inputs.load_charac,
            renewable_characteristics: inputs.res_charac,
            scenarios,
        })
    }

    fn read_inputs(&self, request: &RunRequest) -> Result<RunInputs> {
        let factory = self.backends.config_manager_factory;
        let (input, case, output) = (
            request.input_folder.as_path(),
            request.case.as_str(),
            request.output_folder.as_path(),
        );
        let read = |layout: ConfigLayout| -> Result<(Box<dyn ConfigManager>, Configuration)> {
            let manager = factory(layout);
            manager.validate_configuration()?;
            let config = manager.read_configuration()?;
            Ok((manager, config))
        };

        let (_, global) = read(ConfigLayout::global(input, case, output))?;
        let (load_manager, load) = read(ConfigLayout::load(input, case, output))?;
        let (res_manager, res) = read(ConfigLayout::renewable(input, case, output))?;
        let (_, opf) = read(ConfigLayout::dispatch(input, case, output))?;

        let mut global = global.params;
        global.apply_time_parameters(&request.time_params)?;
        let horizon = global.horizon()?;
        debug!(
            start = %horizon.start,
            dt_minutes = horizon.dt_minutes,
            n_steps = horizon.n_steps,
            "time horizon"
        );

        let (load_params, load_charac) = split_characteristics(load_manager.as_ref(), load)?;
        let (res_params, res_charac) = split_characteristics(res_manager.as_ref(), res)?;
        Ok(RunInputs {
            load_params: load_params.merged_with(&global),
            load_charac,
            res_params: res_params.merged_with(&global),
            res_charac,
            opf_params: opf.params.merged_with(&global),
            global,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn run_scenario(
        &mut self,
        request: &RunRequest,
        case_folder: &Path,
        mode: Mode,
        identity: &ScenarioIdentity,
        seeds: SeedTriple,
        inputs: &RunInputs,
        dispatcher: Option<&mut Dispatcher>,
    ) -> Result<Option<DispatchResult>> {
        let path = identity.path.as_path();
        let mut upstream = Upstream::default();

        if mode.load {
            debug!(scenario = %identity.name, seed = ?seeds.load, "load stage");
            let out = self
                .backends
                .load
                .run(LoadRequest {
                    path,
                    seed: seeds.load,
                    params: &inputs.load_params,
                    characteristics: &inputs.load_charac,
                })
                .map_err(|e| stage_failure(Stage::Load, identity, e))?;
            upstream.load = Some(out.load);
        }

        if mode.renewable {
            debug!(scenario = %identity.name, seed = ?seeds.res, "renewable stage");
            let out = self
                .backends
                .renewable
                .run(RenewableRequest {
                    path,
                    seed: seeds.res,
                    params: &inputs.res_params,
                    characteristics: &inputs.res_charac,
                })
                .map_err(|e| stage_failure(Stage::Renewable, identity, e))?;
            upstream.solar = Some(out.solar);
            upstream.wind = Some(out.wind);
        }

        let loss = if mode.loss {
            debug!(scenario = %identity.name, "loss stage");
            let (load, solar, wind) = upstream.require(Stage::Loss, identity)?;
            let manager = (self.backends.config_manager_factory)(ConfigLayout::loss(
                &request.input_folder,
                &request.case,
                path,
            ));
            let loss = self
                .backends
                .loss
                .run(LossRequest {
                    input_folder: &request.input_folder,
                    path,
                    load,
                    solar,
                    wind,
                    params: &inputs.global,
                    config_manager: manager.as_ref(),
                })
                .map_err(|e| stage_failure(Stage::Loss, identity, e))?;
            Some(loss)
        } else {
            None
        };

        let Some(dispatcher) = dispatcher else {
            return Ok(None);
        };
        debug!(scenario = %identity.name, seed = ?seeds.disp, "dispatch stage");
        let (load, solar, wind) = upstream.require(Stage::Dispatch, identity)?;
        let context = ScenarioContext::new(identity.name.clone(), load.clone(), solar, wind, loss)?;
        dispatcher.replace_scenario(context);

        let result = self
            .backends
            .dispatch
            .run(DispatchRequest {
                dispatcher: &*dispatcher,
                input_path: path,
                output_path: path,
                grid_folder: case_folder,
                seed: seeds.disp,
                params: &inputs.global,
                opf_params: &inputs.opf_params,
            })
            .map_err(|e| stage_failure(Stage::Dispatch, identity, e))?;
        Ok(Some(result))
    }
}
