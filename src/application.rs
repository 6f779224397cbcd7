// This file is part of ts_thrust_jig.
//
// Developed for the Vera Rubin Observatory Systems.
// This product includes software developed by the LSST Project
// (https://www.lsst.org).
// See the COPYRIGHT file at the top-level directory of this distribution
// for details of code ownership.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use log::{error, info, warn};
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::JigError;
use crate::interface::line_channel::StreamLineChannel;
use crate::mock::mock_jig::MockJig;
use crate::plan::plan_file::read_plan_file;
use crate::session::{run_session, SessionOutcome};
use crate::utility::get_timestamped_filepath;

/// Run the application.
///
/// # Arguments
/// * `config_file` - Configuration file.
/// * `filepath_plan` - Test plan file.
/// * `filepath_output` - Telemetry file. If None, a timestamped file in the
/// output directory of the configuration is used.
/// * `port` - Serial port. If empty, the port is read from the configuration
/// file.
/// * `no_teardown` - Skip the teardown ramp or not.
/// * `is_simulation_mode` - Is the simulation mode or not.
///
/// # Returns
/// Result of the session. A failed run returns its failure after the partial
/// telemetry is saved.
pub fn run(
    config_file: &Path,
    filepath_plan: &Path,
    filepath_output: Option<&Path>,
    port: &str,
    no_teardown: bool,
    is_simulation_mode: bool,
) -> Result<(), JigError> {
    // Log the running mode
    let mode = if is_simulation_mode {
        "simulation mode"
    } else {
        "hardware mode"
    };
    info!("Run the thrust jig in {mode}.");

    let config = Config::new(config_file);
    let teardown = config.teardown && !no_teardown;

    let plan = read_plan_file(filepath_plan)?;

    let filepath = get_final_filepath(&config, filepath_output);
    if let Some(directory) = filepath.parent() {
        if let Err(error) = create_dir_all(directory) {
            warn!("Failed to create the directory {:?}: {error}", directory);
        }
    }

    let outcome = if is_simulation_mode {
        let mut jig = MockJig::new();
        run_session(&plan, teardown, &mut jig, Some(&filepath))?
    } else {
        let final_port = get_final_port(&config, port);
        info!("Open the serial port {final_port} at {} baud.", config.baud_rate);

        let stream = serialport::new(&final_port, config.baud_rate)
            .timeout(config.read_timeout())
            .open()
            .map_err(|error| {
                JigError::Transport(format!("failed to open {final_port}: {error}"))
            })?;
        let mut channel = StreamLineChannel::new(&final_port, stream, config.read_timeout())?;

        run_session(&plan, teardown, &mut channel, Some(&filepath))?
    };

    report_outcome(outcome, &filepath)
}

/// Get the final serial port.
///
/// # Arguments
/// * `config` - Configuration.
/// * `port` - Serial port. If the value is empty, the port is read from the
/// configuration.
///
/// # Returns
/// Final serial port.
fn get_final_port(config: &Config, port: &str) -> String {
    if port.is_empty() {
        config.serial_port.clone()
    } else {
        String::from(port)
    }
}

/// Get the final telemetry file.
///
/// # Arguments
/// * `config` - Configuration.
/// * `filepath_output` - Telemetry file. If None, a timestamped file in the
/// output directory is used.
///
/// # Returns
/// Final telemetry file.
fn get_final_filepath(config: &Config, filepath_output: Option<&Path>) -> PathBuf {
    match filepath_output {
        Some(filepath) => filepath.to_path_buf(),
        None => get_timestamped_filepath(&config.output_dir),
    }
}

/// Log the summary of the session.
///
/// # Arguments
/// * `outcome` - Session outcome.
/// * `filepath` - Telemetry file.
///
/// # Returns
/// Failure of the run if any.
fn report_outcome(outcome: SessionOutcome, filepath: &Path) -> Result<(), JigError> {
    match outcome {
        SessionOutcome::Loaded(table) => {
            info!("Loaded {} samples from {:?}.", table.len(), filepath);
            Ok(())
        }
        SessionOutcome::Executed(report) => {
            info!(
                "Run ended in the {} state with {} samples, {} dropped lines, and {} rejections.",
                report.state.as_ref(),
                report.table.len(),
                report.dropped_lines,
                report.rejections
            );

            match report.failure {
                Some(failure) => {
                    error!("Run is incomplete: {failure}");
                    Err(failure)
                }
                None => Ok(()),
            }
        }
    }
}
