//! Runs driven by a TOML run file plus command-line overrides.

mod common;

use chronics_gen::ChronicsGenerator;
use chronics_gen::cli::{CliCommand, parse_args_from};
use chronics_gen::config::RunConfig;
use chronics_gen::stages::{BackendRegistry, outputs};
use common::{CASE, CaseFixture, read};

fn run_file(fixture: &CaseFixture, output: &str) -> String {
    format!(
        r#"
[run]
case = "{CASE}"
input_folder = '{input}'
output_folder = '{output}'
n_scenarios = 2
mode = "LRT"
scenario_prefix = "week"
seed_for_loads = 11
seed_for_res = 12
seed_for_disp = 13

[time]
end_date = "2012-01-01 06:00"
dt = 15
"#,
        input = fixture.input().display(),
        output = fixture.output(output).display(),
    )
}

fn run(cfg: &RunConfig) -> chronics_gen::RunReport {
    assert!(cfg.validate().is_empty(), "{:?}", cfg.validate());
    let backends = BackendRegistry::from_config(&cfg.backends).unwrap();
    ChronicsGenerator::new(backends)
        .run(cfg.run_request())
        .unwrap()
}

#[test]
fn run_file_drives_a_full_run() {
    let fixture = CaseFixture::new();
    let cfg = RunConfig::from_toml_str(&run_file(&fixture, "out")).unwrap();
    let report = run(&cfg);

    assert_eq!(report.scenarios.len(), 2);
    assert_eq!(report.params.u64("n_steps"), Ok(24));
    let out = fixture.output("out");
    for name in ["week_0", "week_1"] {
        assert!(out.join(name).join(outputs::PRODUCTION).is_file());
        assert!(out.join(name).join(outputs::SLACK).is_file());
    }
}

#[test]
fn run_file_seeds_make_runs_repeatable() {
    let fixture = CaseFixture::new();
    for output in ["a", "b"] {
        let cfg = RunConfig::from_toml_str(&run_file(&fixture, output)).unwrap();
        run(&cfg);
    }
    for file in [outputs::LOAD, outputs::SOLAR, outputs::PRODUCTION] {
        assert_eq!(
            read(&fixture.output("a").join("week_1").join(file)),
            read(&fixture.output("b").join("week_1").join(file)),
        );
    }
}

#[test]
fn command_line_overrides_the_run_file() {
    let fixture = CaseFixture::new();
    let mut cfg = RunConfig::from_toml_str(&run_file(&fixture, "out")).unwrap();
    let args = ["--scenarios", "1", "--scenario-id", "holiday", "--mode", "L"]
        .map(String::from)
        .to_vec();
    let CliCommand::Run(opts) = parse_args_from(args).unwrap() else {
        panic!("expected a run command");
    };
    opts.apply(&mut cfg);

    let report = run(&cfg);
    let dir = fixture.output("out").join("holiday");
    assert_eq!(report.scenarios[0].identity.path, dir);
    assert!(dir.join(outputs::LOAD).is_file());
    assert!(!dir.join(outputs::SOLAR).exists());
}

#[test]
fn unknown_backend_is_rejected_before_running() {
    let fixture = CaseFixture::new();
    let raw = format!("{}\n[backends]\ndispatch = \"linear_program\"\n", run_file(&fixture, "out"));
    let cfg = RunConfig::from_toml_str(&raw).unwrap();
    let errors = cfg.validate();
    assert!(errors.iter().any(|e| e.field == "backends.dispatch"));
    assert!(BackendRegistry::from_config(&cfg.backends).is_err());
    assert!(!fixture.output("out").exists());
}
