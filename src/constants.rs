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

// Number of telemetry channels reported by the jig.
pub const NUM_CHANNELS: usize = 9;

// Number of fields in one command line of the test spec.
pub const NUM_COMMAND_FIELDS: usize = 5;

pub const TERMINATOR: &[u8; 1] = b"\n";

// Marker that opens and closes the test spec. The firmware reuses the same
// literal for both.
pub const MARKER_TEST_SPEC: &str = "Begin new test spec";
pub const REQUEST_RUN_TEST: &str = "Run test";

// Any line containing this substring ends the run.
pub const COMPLETION_SUBSTRING: &str = "Stopped";

// Throttle range accepted by the motor driver in percent.
pub const THROTTLE_MIN_PERCENT: f64 = 0.0;
pub const THROTTLE_MAX_PERCENT: f64 = 100.0;

// Teardown ramp appended after the last step.
pub const TEARDOWN_STEP_MS: u64 = 20;
pub const TEARDOWN_THROTTLE_DECREMENT: f64 = 1.0;

// Default read timeout of the byte channel in milliseconds.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 10000;

pub const DEFAULT_BAUD_RATE: u32 = 115200;

pub const DEFAULT_CONFIG_FILE: &str = "config/parameters_app.yaml";
