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

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::utility::get_parameter;

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Config {
    // Configuration filename.
    pub filename: String,
    // Serial port of the thrust jig.
    pub serial_port: String,
    // Baud rate of the serial port.
    pub baud_rate: u32,
    // Timeout of reading a line from the jig in millisecond.
    pub read_timeout_ms: u64,
    // Append the teardown ramp to the test plan or not.
    pub teardown: bool,
    // Directory of the saved experiment data.
    pub output_dir: PathBuf,
}

impl Config {
    /// Create a new config object.
    ///
    /// # Arguments
    /// * `filepath_parameters_app` - The path to the application parameters
    /// file.
    ///
    /// # Returns
    /// A new config object.
    ///
    /// # Panics
    /// If a parameter is missing in the file.
    pub fn new(filepath_parameters_app: &Path) -> Self {
        let output_dir: String = get_parameter(filepath_parameters_app, "output_dir");

        Self {
            filename: filepath_parameters_app.display().to_string(),

            serial_port: get_parameter(filepath_parameters_app, "serial_port"),
            baud_rate: get_parameter(filepath_parameters_app, "baud_rate"),
            read_timeout_ms: get_parameter(filepath_parameters_app, "read_timeout_ms"),
            teardown: get_parameter(filepath_parameters_app, "teardown"),
            output_dir: PathBuf::from(output_dir),
        }
    }

    /// Get the read timeout.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}
