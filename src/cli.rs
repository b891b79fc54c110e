//! Command-line parsing for the `chronics-gen` binary.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::RunConfig;

/// Options given on the command line. Every value overrides the matching
/// field of the run configuration file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub input_folder: Option<PathBuf>,
    pub output_folder: Option<PathBuf>,
    pub case: Option<String>,
    pub n_scenarios: Option<usize>,
    pub mode: Option<String>,
    pub scenario_id: Option<String>,
    pub seed_for_loads: Option<u64>,
    pub seed_for_res: Option<u64>,
    pub seed_for_disp: Option<u64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub dt: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Help,
    Run(CliOptions),
}

pub fn parse_args() -> Result<CliCommand, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

pub fn parse_args_from(args: Vec<String>) -> Result<CliCommand, String> {
    let mut opts = CliOptions::default();
    let mut i = 0usize;

    while i < args.len() {
        let flag = args[i].as_str();
        if flag == "--help" || flag == "-h" {
            return Ok(CliCommand::Help);
        }
        i += 1;
        let value = args
            .get(i)
            .map(String::as_str)
            .ok_or_else(|| format!("missing value for {flag}"));
        match flag {
            "--config" => set(&mut opts.config, flag, PathBuf::from(value?))?,
            "--input" => set(&mut opts.input_folder, flag, PathBuf::from(value?))?,
            "--output" => set(&mut opts.output_folder, flag, PathBuf::from(value?))?,
            "--case" => set(&mut opts.case, flag, value?.to_string())?,
            "--scenarios" => set(&mut opts.n_scenarios, flag, parse(flag, value?)?)?,
            "--mode" => set(&mut opts.mode, flag, value?.to_string())?,
            "--scenario-id" => set(&mut opts.scenario_id, flag, value?.to_string())?,
            "--seed-loads" => set(&mut opts.seed_for_loads, flag, parse(flag, value?)?)?,
            "--seed-res" => set(&mut opts.seed_for_res, flag, parse(flag, value?)?)?,
            "--seed-disp" => set(&mut opts.seed_for_disp, flag, parse(flag, value?)?)?,
            "--start-date" => set(&mut opts.start_date, flag, value?.to_string())?,
            "--end-date" => set(&mut opts.end_date, flag, value?.to_string())?,
            "--dt" => set(&mut opts.dt, flag, parse(flag, value?)?)?,
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    Ok(CliCommand::Run(opts))
}

fn set<T>(slot: &mut Option<T>, flag: &str, value: T) -> Result<(), String> {
    if slot.replace(value).is_some() {
        return Err(format!("{flag} provided more than once"));
    }
    Ok(())
}

fn parse<T: FromStr>(flag: &str, raw: &str) -> Result<T, String> {
    raw.parse()
        .map_err(|_| format!("{flag} value \"{raw}\" is not a valid non-negative integer"))
}

impl CliOptions {
    /// Writes the command-line overrides into `cfg`.
    pub fn apply(&self, cfg: &mut RunConfig) {
        let run = &mut cfg.run;
        if let Some(v) = &self.input_folder {
            run.input_folder = v.clone();
        }
        if let Some(v) = &self.output_folder {
            run.output_folder = v.clone();
        }
        if let Some(v) = &self.case {
            run.case = v.clone();
        }
        if let Some(v) = self.n_scenarios {
            run.n_scenarios = v;
        }
        if let Some(v) = &self.mode {
            run.mode = v.clone();
        }
        if self.scenario_id.is_some() {
            run.scenario_id = self.scenario_id.clone();
        }
        run.seed_for_loads = self.seed_for_loads.or(run.seed_for_loads);
        run.seed_for_res = self.seed_for_res.or(run.seed_for_res);
        run.seed_for_disp = self.seed_for_disp.or(run.seed_for_disp);

        let time = &mut cfg.time;
        if self.start_date.is_some() {
            time.start_date = self.start_date.clone();
        }
        if self.end_date.is_some() {
            time.end_date = self.end_date.clone();
        }
        time.dt = self.dt.or(time.dt);
    }
}

pub fn print_usage() {
    eprintln!("chronics-gen: scenario chronics generation");
    eprintln!();
    eprintln!("Usage: chronics-gen [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>          Load the run configuration from a TOML file");
    eprintln!("  --input <dir>            Folder holding the case folders");
    eprintln!("  --output <dir>           Folder receiving one directory per scenario");
    eprintln!("  --case <name>            Case folder name");
    eprintln!("  --scenarios <n>          Number of scenarios");
    eprintln!("  --mode <letters>         Stages to run: L, R, D (loss), T (dispatch), K");
    eprintln!("  --scenario-id <name>     Name of the single scenario to generate");
    eprintln!("  --seed-loads <u64>       Base seed of the load stage");
    eprintln!("  --seed-res <u64>         Base seed of the renewable stage");
    eprintln!("  --seed-disp <u64>        Base seed of the dispatch stage");
    eprintln!("  --start-date <datetime>  First timestamp, \"YYYY-MM-DD HH:MM\"");
    eprintln!("  --end-date <datetime>    End of the horizon, \"YYYY-MM-DD HH:MM\"");
    eprintln!("  --dt <minutes>           Step length");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("Set RUST_LOG (e.g. RUST_LOG=debug) to change the log level.");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn options(raw: &[&str]) -> CliOptions {
        match parse_args_from(args(raw)) {
            Ok(CliCommand::Run(opts)) => opts,
            other => panic!("unexpected parse result: {other:?}"),
        }
    }

    #[test]
    fn parses_single_scenario_invocation() {
        let opts = options(&[
            "--case",
            "case118",
            "--scenarios",
            "1",
            "--scenario-id",
            "2012_january_3",
            "--seed-loads",
            "7",
            "--mode",
            "LR",
        ]);
        assert_eq!(opts.case.as_deref(), Some("case118"));
        assert_eq!(opts.n_scenarios, Some(1));
        assert_eq!(opts.scenario_id.as_deref(), Some("2012_january_3"));
        assert_eq!(opts.seed_for_loads, Some(7));
        assert_eq!(opts.mode.as_deref(), Some("LR"));
    }

    #[test]
    fn help_short_circuits() {
        assert_eq!(
            parse_args_from(args(&["--case", "x", "--help"])),
            Ok(CliCommand::Help)
        );
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse_args_from(args(&["--scenarios", "-2"])).is_err());
        assert!(parse_args_from(args(&["--dt"])).is_err());
        assert!(parse_args_from(args(&["--bogus", "1"])).is_err());
        assert!(parse_args_from(args(&["--case", "a", "--case", "b"])).is_err());
    }

    #[test]
    fn overrides_config_values() {
        let mut cfg = RunConfig::baseline();
        cfg.run.seed_for_res = Some(5);
        let opts = options(&["--scenarios", "4", "--seed-loads", "1", "--dt", "15"]);
        opts.apply(&mut cfg);
        assert_eq!(cfg.run.n_scenarios, 4);
        assert_eq!(cfg.run.seed_for_loads, Some(1));
        assert_eq!(cfg.run.seed_for_res, Some(5));
        assert_eq!(cfg.time.dt, Some(15));
        assert_eq!(cfg.run.case, "case118");
    }
}
