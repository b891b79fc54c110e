//! chronics-gen entry point: CLI wiring and config-driven generator construction.

use std::error::Error as _;
use std::process;

use tracing::Level;
use tracing_subscriber::EnvFilter;

use chronics_gen::ChronicsGenerator;
use chronics_gen::cli::{CliCommand, parse_args, print_usage};
use chronics_gen::config::RunConfig;
use chronics_gen::reporting::print_run_report;
use chronics_gen::stages::BackendRegistry;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_target(false)
        .init();

    let opts = match parse_args() {
        Ok(CliCommand::Run(opts)) => opts,
        Ok(CliCommand::Help) => {
            print_usage();
            process::exit(0);
        }
        Err(e) => {
            eprintln!("error: {e}");
            print_usage();
            process::exit(1);
        }
    };

    // --config first, then command-line overrides
    let mut cfg = match &opts.config {
        Some(path) => match RunConfig::from_toml_file(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        },
        None => RunConfig::baseline(),
    };
    opts.apply(&mut cfg);

    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let backends = match BackendRegistry::from_config(&cfg.backends) {
        Ok(backends) => backends,
        Err(errors) => {
            for e in &errors {
                eprintln!("{e}");
            }
            process::exit(1);
        }
    };

    let mut generator = ChronicsGenerator::new(backends);
    match generator.run(cfg.run_request()) {
        Ok(report) => print_run_report(&report),
        Err(e) => {
            eprintln!("error: {e}");
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            process::exit(1);
        }
    }
}
