use clap::{value_parser, Arg, ArgAction, Command};
use log::{error, info};
use simplelog::{
    format_description, ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, TermLogger,
    TerminalMode, WriteLogger,
};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::exit;

use run_thrust_jig::application;
use run_thrust_jig::constants::DEFAULT_CONFIG_FILE;

fn main() {
    // Parse the command line arguments
    let matches = Command::new("thrust jig")
        .about("Run a test plan on the thrust jig and save the telemetry.")
        .arg(
            Arg::new("plan")
                .long("plan")
                .value_name("FILE")
                .required(true)
                .help("Test plan file in YAML")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Telemetry file. If it exists, the telemetry is loaded instead of a new run. Default is a timestamped file in the output directory.")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("DEVICE")
                .help("Serial port to override the configuration file. Default is the port in the configuration file."),
        )
        .arg(
            Arg::new("no-teardown")
                .long("no-teardown")
                .action(ArgAction::SetTrue)
                .help("Do not ramp the throttles down to zero after the plan"),
        )
        .arg(
            Arg::new("simulate")
                .short('s')
                .long("simulate")
                .action(ArgAction::SetTrue)
                .help("Run the simulation mode"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Application configuration file")
                .default_value(DEFAULT_CONFIG_FILE)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("level")
                .short('l')
                .long("log-level")
                .help("Log level: 0 (Off), 1 (Error), 2 (Warn), 3 (Info), 4 (Debug), 5 (Trace)")
                .default_value("3")
                .value_parser(value_parser!(u32)),
        )
        .get_matches();

    let filepath_plan = matches
        .get_one::<PathBuf>("plan")
        .expect("The plan file is required.");
    let filepath_output = matches.get_one::<PathBuf>("output");
    let port = matches
        .get_one::<String>("port")
        .map_or("", |port| port.as_str());
    let config_file = matches
        .get_one::<PathBuf>("config")
        .expect("There should be a default configuration file.");

    // Check the simulation mode and teardown
    let is_simulation_mode = matches.get_flag("simulate");
    let no_teardown = matches.get_flag("no-teardown");

    // Check the log filter
    let log_filter = get_log_filter(matches.get_one::<u32>("level"));

    // Initiate the logger
    initiate_logger(log_filter, "application.log");
    info!("Log level: {log_filter}.");

    // Run the application
    if let Err(error) = application::run(
        config_file,
        filepath_plan,
        filepath_output.map(|filepath| filepath.as_path()),
        port,
        no_teardown,
        is_simulation_mode,
    ) {
        error!("Thrust jig run failed: {error}");
        exit(1);
    }
}

/// Get the log filter.
///
/// # Arguments
/// * `log_level` - Log level.
///
/// # Returns
/// Log filter.
fn get_log_filter(log_level: Option<&u32>) -> LevelFilter {
    match log_level {
        Some(level) => match level {
            0 => LevelFilter::Off,
            1 => LevelFilter::Error,
            2 => LevelFilter::Warn,
            3 => LevelFilter::Info,
            4 => LevelFilter::Debug,
            5 => LevelFilter::Trace,
            _ => LevelFilter::Info,
        },
        None => LevelFilter::Info,
    }
}

/// Initiate the logger.
///
/// # Arguments
/// * `level` - Log level.
/// * `filepath` - Log file path.
fn initiate_logger(level: LevelFilter, filepath: &str) {
    let config = ConfigBuilder::new()
        .set_time_format_custom(format_description!(
            "[year]/[month]/[day] [hour]:[minute]:[second].[subsecond]"
        ))
        .build();

    // Log to the terminal
    let logger_terminal = TermLogger::new(
        level,
        config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );

    // Log to the file
    match File::create(Path::new(filepath)) {
        Ok(file) => {
            let logger_file = WriteLogger::new(level, config, file);
            let _ = CombinedLogger::init(vec![logger_terminal, logger_file]);
        }
        Err(error) => {
            eprintln!("Failed to create the log file: {error}.");
            let _ = CombinedLogger::init(vec![logger_terminal]);
        }
    }
}
