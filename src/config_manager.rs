//! Input configuration managers, one per generation domain.
//!
//! A manager knows where a domain's inputs live under the input folder,
//! checks that the required files exist, creates the output folder and reads
//! the domain parameters and optional characteristics table.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::chronics::CharacteristicsTable;
use crate::error::{GenerationError, Result};
use crate::io::import::read_characteristics;
use crate::params::GenerationParameters;

/// Parsed configuration of one domain.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub params: GenerationParameters,
    pub characteristics: Option<CharacteristicsTable>,
}

/// Contract for reading a domain's input configuration.
pub trait ConfigManager {
    /// Human-readable domain name, used in errors and logs.
    fn name(&self) -> &str;

    /// Fails if a required input is missing. Creates the output directory
    /// tree if absent.
    fn validate_configuration(&self) -> Result<()>;

    /// Reads the domain parameters and, for domains that have one, the
    /// characteristics table. Repeated calls return equal data.
    fn read_configuration(&self) -> Result<Configuration>;
}

/// Builds a [`ConfigManager`] for a layout. Lets callers swap the
/// file-backed implementation.
pub type ConfigManagerFactory = fn(ConfigLayout) -> Box<dyn ConfigManager>;

/// Default factory returning a [`FileConfigManager`].
pub fn file_config_manager(layout: ConfigLayout) -> Box<dyn ConfigManager> {
    Box::new(FileConfigManager::new(layout))
}

/// Where a domain's files live.
///
/// `input_directories` maps a logical key to a folder relative to `root`;
/// `required_input_files` lists, per key, the files that must exist there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLayout {
    pub name: String,
    pub root: PathBuf,
    pub input_directories: BTreeMap<String, String>,
    pub required_input_files: BTreeMap<String, Vec<String>>,
    pub output_directory: PathBuf,
    /// `(directory key, file name)` of the JSON parameter file.
    pub params_file: (String, String),
    /// `(directory key, file name)` of the characteristics CSV, if any.
    pub characteristics_file: Option<(String, String)>,
}

/// Name of the domain-specific files inside a case folder.
pub mod files {
    pub const GLOBAL_PARAMS: &str = "params.json";
    pub const LOAD_PARAMS: &str = "params_load.json";
    pub const LOAD_CHARAC: &str = "loads_charac.csv";
    pub const RES_PARAMS: &str = "params_res.json";
    pub const RES_CHARAC: &str = "prods_charac.csv";
    pub const OPF_PARAMS: &str = "params_opf.json";
    pub const LOSS_PARAMS: &str = "params_loss.json";
    pub const GRID: &str = "grid.json";
}

const CASE_KEY: &str = "case";

impl ConfigLayout {
    fn for_case(
        name: &str,
        input_folder: &Path,
        case: &str,
        output_folder: &Path,
        params: &str,
        characteristics: Option<&str>,
    ) -> Self {
        let mut required = vec![params.to_string()];
        required.extend(characteristics.map(str::to_string));
        Self {
            name: name.to_string(),
            root: input_folder.to_path_buf(),
            input_directories: BTreeMap::from([(CASE_KEY.to_string(), case.to_string())]),
            required_input_files: BTreeMap::from([(CASE_KEY.to_string(), required)]),
            output_directory: output_folder.to_path_buf(),
            params_file: (CASE_KEY.to_string(), params.to_string()),
            characteristics_file: characteristics.map(|c| (CASE_KEY.to_string(), c.to_string())),
        }
    }

    pub fn global(input_folder: &Path, case: &str, output_folder: &Path) -> Self {
        Self::for_case(
            "Global Generation",
            input_folder,
            case,
            output_folder,
            files::GLOBAL_PARAMS,
            None,
        )
    }

    pub fn load(input_folder: &Path, case: &str, output_folder: &Path) -> Self {
        Self::for_case(
            "Loads Generation",
            input_folder,
            case,
            output_folder,
            files::LOAD_PARAMS,
            Some(files::LOAD_CHARAC),
        )
    }

    pub fn renewable(input_folder: &Path, case: &str, output_folder: &Path) -> Self {
        Self::for_case(
            "Renewables Generation",
            input_folder,
            case,
            output_folder,
            files::RES_PARAMS,
            Some(files::RES_CHARAC),
        )
    }

    pub fn dispatch(input_folder: &Path, case: &str, output_folder: &Path) -> Self {
        Self::for_case(
            "Dispatch",
            input_folder,
            case,
            output_folder,
            files::OPF_PARAMS,
            None,
        )
    }

    pub fn loss(input_folder: &Path, case: &str, output_folder: &Path) -> Self {
        Self::for_case("Loss", input_folder, case, output_folder, files::LOSS_PARAMS, None)
    }

    /// Absolute path of `file` in the directory registered under `key`.
    pub fn path_of(&self, key: &str, file: &str) -> Option<PathBuf> {
        self.input_directories
            .get(key)
            .map(|dir| self.root.join(dir).join(file))
    }
}

/// [`ConfigManager`] reading JSON parameters and CSV characteristics from
/// disk.
#[derive(Debug, Clone)]
pub struct FileConfigManager {
    layout: ConfigLayout,
}

impl FileConfigManager {
    pub fn new(layout: ConfigLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &ConfigLayout {
        &self.layout
    }

    fn resolve(&self, key: &str, file: &str) -> Result<PathBuf> {
        self.layout.path_of(key, file).ok_or_else(|| {
            GenerationError::configuration(
                &self.layout.name,
                format!("no input directory registered for \"{key}\""),
            )
        })
    }
}

impl ConfigManager for FileConfigManager {
    fn name(&self) -> &str {
        &self.layout.name
    }

    fn validate_configuration(&self) -> Result<()> {
        for (key, required) in &self.layout.required_input_files {
            for file in required {
                let path = self.resolve(key, file)?;
                if !path.is_file() {
                    return Err(GenerationError::configuration(
                        &self.layout.name,
                        format!("missing required input file {}", path.display()),
                    ));
                }
            }
        }
        let out = &self.layout.output_directory;
        fs::create_dir_all(out).map_err(|e| GenerationError::io(out, e))?;
        debug!(domain = %self.layout.name, "configuration validated");
        Ok(())
    }

    fn read_configuration(&self) -> Result<Configuration> {
        let (key, file) = &self.layout.params_file;
        let params_path = self.resolve(key, file)?;
        let raw = fs::read_to_string(&params_path).map_err(|e| {
            GenerationError::configuration(
                &self.layout.name,
                format!("cannot read {}: {e}", params_path.display()),
            )
        })?;
        let params = GenerationParameters::from_json_str(&raw).map_err(|e| {
            GenerationError::configuration(
                &self.layout.name,
                format!("invalid parameters in {}: {e}", params_path.display()),
            )
        })?;

        let characteristics = match &self.layout.characteristics_file {
            Some((key, file)) => {
                let path = self.resolve(key, file)?;
                let table = read_characteristics(&path).map_err(|e| {
                    GenerationError::configuration(&self.layout.name, e.to_string())
                })?;
                Some(table)
            }
            None => None,
        };

        Ok(Configuration {
            params,
            characteristics,
        })
    }
}
