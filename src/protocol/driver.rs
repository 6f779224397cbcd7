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

use log::{debug, error, info, warn};
use strum::IntoEnumIterator;

use crate::constants::{COMPLETION_SUBSTRING, MARKER_TEST_SPEC, REQUEST_RUN_TEST};
use crate::enums::{CommandField, ControlMessage, DriverState};
use crate::error::JigError;
use crate::interface::line_channel::LineChannel;
use crate::plan::test_command::TestCommand;
use crate::telemetry::ingester::ingest_line;
use crate::telemetry::telemetry_sample::TelemetrySample;
use crate::telemetry::telemetry_table::TelemetryTable;

/// Result of one run. The telemetry captured before a failure is kept.
#[derive(Debug)]
pub struct RunReport {
    // Stopped or Failed.
    pub state: DriverState,
    pub table: TelemetryTable,
    // Telemetry lines that could not be parsed.
    pub dropped_lines: usize,
    // Invalid command/state replies of the firmware.
    pub rejections: usize,
    pub failure: Option<JigError>,
}

impl RunReport {
    /// Check if the jig reported the completion of the test.
    pub fn is_complete(&self) -> bool {
        self.state == DriverState::Stopped
    }
}

/// Drive the jig through the load, arm, run, and stop handshake.
pub struct ProtocolDriver<'a, C: LineChannel> {
    _state: DriverState,
    _channel: &'a mut C,
    // Samples of the run in arrival order.
    _samples: Vec<TelemetrySample>,
    _dropped_lines: usize,
    _rejections: usize,
    // Line received while arming that belongs to the run.
    _pending_line: Option<String>,
}

impl<'a, C: LineChannel> ProtocolDriver<'a, C> {
    /// Create a new protocol driver.
    ///
    /// # Arguments
    /// * `channel` - Byte channel to the jig. Its read timeout bounds every
    /// wait.
    ///
    /// # Returns
    /// A new driver in the idle state.
    pub fn new(channel: &'a mut C) -> Self {
        Self {
            _state: DriverState::Idle,
            _channel: channel,
            _samples: Vec::new(),
            _dropped_lines: 0,
            _rejections: 0,
            _pending_line: None,
        }
    }

    pub fn state(&self) -> DriverState {
        self._state
    }

    /// Load the commands, run the test, and collect the telemetry until the
    /// jig reports the completion. A run that never completes ends with the
    /// read timeout of the channel.
    ///
    /// # Arguments
    /// * `commands` - Compiled commands.
    ///
    /// # Returns
    /// Run report.
    pub fn execute(mut self, commands: &[TestCommand]) -> RunReport {
        let failure = match self.drive(commands) {
            Ok(()) => None,
            Err(error) => {
                error!(
                    "Run failed in the {} state with {} samples: {error}",
                    self._state.as_ref(),
                    self._samples.len()
                );

                self.transition(DriverState::Failed);
                self._channel.close();

                Some(error)
            }
        };

        RunReport {
            state: self._state,
            table: TelemetryTable::finalize(self._samples),
            dropped_lines: self._dropped_lines,
            rejections: self._rejections,
            failure,
        }
    }

    fn drive(&mut self, commands: &[TestCommand]) -> Result<(), JigError> {
        self.load_spec(commands)?;
        self.arm()?;
        self.run()
    }

    /// Transition to a new state.
    fn transition(&mut self, state: DriverState) {
        info!(
            "Driver state: {} -> {}.",
            self._state.as_ref(),
            state.as_ref()
        );
        self._state = state;
    }

    /// Send the test spec. There is no acknowledgement per line.
    fn load_spec(&mut self, commands: &[TestCommand]) -> Result<(), JigError> {
        self.transition(DriverState::SpecLoading);

        self._channel.write_line(MARKER_TEST_SPEC)?;
        self._channel.write_line(&CommandField::header())?;
        self._channel.write_line(MARKER_TEST_SPEC)?;

        for command in commands {
            self._channel.write_line(&command.to_wire_line())?;
        }

        info!("Loaded {} commands.", commands.len());
        self.transition(DriverState::SpecLoaded);

        Ok(())
    }

    /// Request the run and go through the prologue of the firmware. The
    /// control messages are only logged. The first other line ends the
    /// prologue and is handled as part of the run.
    fn arm(&mut self) -> Result<(), JigError> {
        self.transition(DriverState::Arming);

        self._channel.write_line(REQUEST_RUN_TEST)?;

        for _ in 0..ControlMessage::iter().count() {
            let line = self._channel.read_line()?;
            match ControlMessage::recognize(&line) {
                Some(message) => {
                    self.account_control_message(message);
                    if message == ControlMessage::TelemetryHeader {
                        break;
                    }
                }
                None => {
                    self._pending_line = Some(line);
                    break;
                }
            }
        }

        self.transition(DriverState::Running);

        Ok(())
    }

    /// Collect the telemetry until the completion line.
    fn run(&mut self) -> Result<(), JigError> {
        loop {
            let line = match self._pending_line.take() {
                Some(line) => line,
                None => self._channel.read_line()?,
            };

            if line.contains(COMPLETION_SUBSTRING) {
                info!(
                    "Jig reports the completion: {line}. Collected {} samples.",
                    self._samples.len()
                );
                self.transition(DriverState::Stopped);

                return Ok(());
            }

            self.handle_line(&line);
        }
    }

    /// Handle one line received while running.
    fn handle_line(&mut self, line: &str) {
        if line.trim().is_empty() {
            debug!("Skip the empty line.");
            return;
        }

        if let Some(message) = ControlMessage::recognize(line) {
            self.account_control_message(message);
            return;
        }

        match ingest_line(line) {
            Ok(sample) => self._samples.push(sample),
            Err(error) => {
                warn!("Drop the telemetry: {error}");
                self._dropped_lines += 1;
            }
        }
    }

    fn account_control_message(&mut self, message: ControlMessage) {
        if message.is_rejection() {
            warn!("Jig rejects the request: {}.", message.as_ref());
            self._rejections += 1;
        } else {
            debug!("Jig reports: {}.", message.as_ref());
        }
    }
}
