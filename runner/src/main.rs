//! Mobile ad hoc network simulator CLI

use adhoc_runner::{
    config::{self, Config},
    simulate, APPLICATIONS,
};
use clap::{builder::PossibleValuesParser, Arg, ArgAction, Command};
use std::{path::PathBuf, process::ExitCode};
use tracing::{error, info, Level};

/// Returns the version of the crate.
pub const fn crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Flag for verbose output
const VERBOSE_FLAG: &str = "verbose";

/// Flag to write a configuration template
const INIT_FLAG: &str = "init";

/// Flag to print a description of the simulator
const DESCRIPTION_FLAG: &str = "description";

/// Flag to print the metrics collected during the run
const METRICS_FLAG: &str = "metrics";

/// Argument selecting the built-in application
const APPLICATION_ARG: &str = "application";

/// Path to the YAML configuration
const CONFIGURATION_ARG: &str = "configuration";

const DESCRIPTION: &str = "\
Discrete-time simulator for mobile ad hoc networks.

Every step, the simulator applies the failure model, moves every node with the mobility \
model, recomputes neighbors with the propagation model, transmits and delivers in-flight \
packets (dropping targets that left range or were lost by the packet loss model), and \
finally runs the application of every node that has not failed.

Run `adhoc --init DIR` to write a commented configuration template, then \
`adhoc DIR/configuration.yaml` to simulate it.";

/// Entrypoint for the simulator CLI
fn main() -> ExitCode {
    // Define application
    let matches = Command::new("adhoc")
        .version(crate_version())
        .about("Simulate mobile ad hoc networks from a YAML configuration.")
        .arg(
            Arg::new(CONFIGURATION_ARG)
                .help("Path to YAML config file")
                .required_unless_present_any([INIT_FLAG, DESCRIPTION_FLAG])
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(APPLICATION_ARG)
                .short('a')
                .long(APPLICATION_ARG)
                .default_value(APPLICATIONS[0])
                .help("Application run by every node")
                .value_parser(PossibleValuesParser::new(APPLICATIONS.iter().copied())),
        )
        .arg(
            Arg::new(INIT_FLAG)
                .long(INIT_FLAG)
                .value_name("DIR")
                .help("Write a configuration template into DIR")
                .conflicts_with(CONFIGURATION_ARG)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(DESCRIPTION_FLAG)
                .long(DESCRIPTION_FLAG)
                .help("Describe the simulator")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(METRICS_FLAG)
                .short('m')
                .long(METRICS_FLAG)
                .help("Print the collected metrics after the run")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(VERBOSE_FLAG)
                .short('v')
                .long(VERBOSE_FLAG)
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let verbose = matches.get_flag(VERBOSE_FLAG);

    // Handle informational flags
    if matches.get_flag(DESCRIPTION_FLAG) {
        println!("{DESCRIPTION}");
        return ExitCode::SUCCESS;
    }
    if let Some(directory) = matches.get_one::<PathBuf>(INIT_FLAG) {
        init_logger(if verbose { Level::DEBUG } else { Level::INFO });
        if let Err(e) = config::init(directory) {
            error!(error=?e, directory=?directory, "failed to write configuration template");
            return ExitCode::FAILURE;
        }
        info!(path=?directory.join(config::TEMPLATE_NAME), "wrote configuration template");
        return ExitCode::SUCCESS;
    }

    // Load configuration
    let Some(path) = matches.get_one::<PathBuf>(CONFIGURATION_ARG) else {
        // Enforced by clap
        return ExitCode::FAILURE;
    };
    let config = match Config::load(path) {
        Ok(config) => config,
        Err(e) => {
            init_logger(Level::ERROR);
            error!(error=?e, path=?path, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    init_logger(if verbose {
        Level::DEBUG
    } else {
        config.log_level.into()
    });

    // Run simulation
    let Some(application) = matches.get_one::<String>(APPLICATION_ARG) else {
        return ExitCode::FAILURE;
    };
    match simulate(application, &config) {
        Ok(metrics) => {
            if matches.get_flag(METRICS_FLAG) {
                print!("{metrics}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error=?e, application = %application, "simulation failed");
            ExitCode::FAILURE
        }
    }
}

fn init_logger(level: Level) {
    tracing_subscriber::fmt().with_max_level(level).init();
}
