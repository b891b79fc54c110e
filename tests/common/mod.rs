//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use chronics_gen::RunRequest;
use chronics_gen::seeds::SeedTriple;
use tempfile::TempDir;

pub const CASE: &str = "case_test";

pub const GLOBAL_PARAMS: &str = r#"{
    "dt": 60,
    "start_date": "2012-01-01 00:00",
    "end_date": "2012-01-02 00:00",
    "planned_std": 0.01
}"#;

pub const LOAD_PARAMS: &str = r#"{"load_noise_std": 0.02, "load_base_ratio": 0.6}"#;

pub const LOADS_CHARAC: &str = "\
name,zone,Pmax
load_1_0,R1,120
load_3_1,R1,80
load_4_2,R2,60
";

pub const RES_PARAMS: &str = r#"{"solar_alpha": 0.9, "wind_mean_ratio": 0.35}"#;

pub const PRODS_CHARAC: &str = "\
name,type,Pmax
gen_0_solar,solar,60
gen_1_wind,wind,100
gen_2_wind,wind,50
gen_3_thermal,thermal,300
";

pub const OPF_PARAMS: &str = r#"{"reserve_margin": 0.1}"#;

pub const LOSS_PARAMS: &str = r#"{"loss_pct": 2.0}"#;

pub const GRID: &str = r#"{
    "generators": [
        {"name": "gen_0_solar", "carrier": "solar", "p_max": 60.0},
        {"name": "gen_1_wind", "carrier": "wind", "p_max": 100.0},
        {"name": "gen_2_wind", "carrier": "wind", "p_max": 50.0},
        {"name": "gen_3_thermal", "carrier": "thermal", "p_max": 300.0, "marginal_cost": 45.0},
        {"name": "gen_4_nuclear", "carrier": "nuclear", "p_min": 20.0, "p_max": 150.0, "marginal_cost": 12.0}
    ]
}"#;

/// A complete case folder in a temporary directory.
pub struct CaseFixture {
    pub dir: TempDir,
}

impl CaseFixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let case = dir.path().join("input").join(CASE);
        fs::create_dir_all(&case).unwrap();
        for (file, content) in [
            ("params.json", GLOBAL_PARAMS),
            ("params_load.json", LOAD_PARAMS),
            ("loads_charac.csv", LOADS_CHARAC),
            ("params_res.json", RES_PARAMS),
            ("prods_charac.csv", PRODS_CHARAC),
            ("params_opf.json", OPF_PARAMS),
            ("params_loss.json", LOSS_PARAMS),
            ("grid.json", GRID),
        ] {
            fs::write(case.join(file), content).unwrap();
        }
        Self { dir }
    }

    pub fn input(&self) -> PathBuf {
        self.dir.path().join("input")
    }

    pub fn case_file(&self, file: &str) -> PathBuf {
        self.input().join(CASE).join(file)
    }

    /// Output folder `name` under the fixture root (not created).
    pub fn output(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Batch request writing to `output`.
    pub fn request(&self, n_scenarios: usize, mode: &str, output: &Path) -> RunRequest {
        RunRequest::new(CASE, n_scenarios, self.input(), output).with_mode(mode)
    }
}

pub fn seeds(load: u64, res: u64, disp: u64) -> SeedTriple {
    SeedTriple {
        load: Some(load),
        res: Some(res),
        disp: Some(disp),
    }
}

pub fn read(path: &Path) -> Vec<u8> {
    fs::read(path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}
