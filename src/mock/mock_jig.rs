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

use log::debug;
use std::collections::VecDeque;
use std::time::Duration;

use crate::constants::{
    COMPLETION_SUBSTRING, MARKER_TEST_SPEC, NUM_COMMAND_FIELDS, REQUEST_RUN_TEST,
};
use crate::enums::ControlMessage;
use crate::error::JigError;
use crate::interface::line_channel::LineChannel;
use crate::mock::mock_constants::{
    JIG_BATTERY_RESISTANCE, JIG_BATTERY_VOLTAGE, JIG_CURRENT_PER_PERCENT, JIG_IDLE_CURRENT,
    JIG_RPM_PER_PERCENT, JIG_SAMPLE_PERIOD_MS, JIG_THRUST_COEFFICIENT, JIG_TORQUE_COEFFICIENT,
};

#[derive(Debug, PartialEq, Clone, Copy)]
enum FirmwareState {
    WaitSpec,
    SkipHeader,
    ReceiveCommands,
    Running,
}

/// Command set parsed by the firmware.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct CommandSet {
    pub time_ms: u64,
    pub top_percent: f64,
    pub bottom_percent: f64,
    pub pitch_us: i32,
    pub roll_us: i32,
}

impl CommandSet {
    /// Parse the command line like the firmware does.
    ///
    /// # Arguments
    /// * `line` - time_ms,top,bottom,pitch_us,roll_us
    ///
    /// # Returns
    /// Command set, or None if the line is invalid.
    fn parse(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != NUM_COMMAND_FIELDS {
            return None;
        }

        Some(Self {
            time_ms: fields[0].parse().ok()?,
            top_percent: fields[1].parse().ok()?,
            bottom_percent: fields[2].parse().ok()?,
            pitch_us: fields[3].parse().ok()?,
            roll_us: fields[4].parse().ok()?,
        })
    }
}

/// Simulated thrust jig firmware. Replies are queued when a line is written
/// and a read with nothing queued times out.
pub struct MockJig {
    _state: FirmwareState,
    // Test spec received from the host.
    pub test_spec: Vec<CommandSet>,
    // Lines received from the host.
    pub received: Vec<String>,
    _outgoing: VecDeque<String>,
    // Extra firmware text sent before the telemetry header.
    _chatter: Vec<String>,
    // Stop sending after this number of telemetry samples.
    _samples_before_timeout: Option<usize>,
    pub timeout: Duration,
    pub is_closed: bool,
}

impl MockJig {
    /// Create a new simulated jig that has just booted.
    pub fn new() -> Self {
        Self {
            _state: FirmwareState::WaitSpec,
            test_spec: Vec::new(),
            received: Vec::new(),
            _outgoing: VecDeque::from([
                String::from(ControlMessage::Banner.as_ref()),
                String::from(ControlMessage::ReadyToLoad.as_ref()),
            ]),
            _chatter: Vec::new(),
            _samples_before_timeout: None,
            timeout: Duration::ZERO,
            is_closed: false,
        }
    }

    /// Send extra firmware text before the telemetry header.
    pub fn with_chatter(mut self, lines: &[&str]) -> Self {
        self._chatter = lines.iter().map(|line| String::from(*line)).collect();
        self
    }

    /// Go silent after a number of telemetry samples.
    pub fn with_timeout_after(mut self, samples: usize) -> Self {
        self._samples_before_timeout = Some(samples);
        self
    }

    /// Process one line like the firmware does.
    fn process(&mut self, line: &str) {
        // The firmware ignores the empty lines.
        if line.is_empty() {
            return;
        }

        match self._state {
            FirmwareState::WaitSpec => {
                if line == MARKER_TEST_SPEC {
                    self.begin_spec();
                } else {
                    self.reply(ControlMessage::InvalidCommand.as_ref());
                }
            }

            FirmwareState::SkipHeader => {
                self._state = FirmwareState::ReceiveCommands;
            }

            FirmwareState::ReceiveCommands => {
                if line == MARKER_TEST_SPEC {
                    self.begin_spec();
                } else if line == REQUEST_RUN_TEST {
                    if self.test_spec.is_empty() {
                        self.reply(ControlMessage::InvalidState.as_ref());
                    } else {
                        self.start_test();
                    }
                } else {
                    match CommandSet::parse(line) {
                        Some(command_set) => self.test_spec.push(command_set),
                        None => self.reply(ControlMessage::InvalidCommand.as_ref()),
                    }
                }
            }

            FirmwareState::Running => {
                debug!("Mock jig ignores {line} while running.");
            }
        }
    }

    /// Clear the test spec. The next line is taken as the CSV header.
    fn begin_spec(&mut self) {
        self.test_spec.clear();
        self._state = FirmwareState::SkipHeader;
    }

    fn reply(&mut self, line: &str) {
        self._outgoing.push_back(String::from(line));
    }

    /// Queue the prologue, the telemetry, and the completion line.
    fn start_test(&mut self) {
        self._state = FirmwareState::Running;

        for message in [
            ControlMessage::SettingUp,
            ControlMessage::Ready,
            ControlMessage::Starting,
        ] {
            self.reply(message.as_ref());
        }
        for line in self._chatter.clone() {
            self.reply(&line);
        }
        self.reply(ControlMessage::TelemetryHeader.as_ref());

        let lines = self.telemetry_lines();
        let number_of_samples = self
            ._samples_before_timeout
            .map_or(lines.len(), |samples| samples.min(lines.len()));
        for line in lines.iter().take(number_of_samples) {
            self.reply(line);
        }

        if self._samples_before_timeout.is_none() {
            self.reply(&format!("Test {COMPLETION_SUBSTRING}"));
        }
    }

    /// Synthesize the telemetry of the loaded test spec. Each command is held
    /// until the time of the next one.
    ///
    /// # Returns
    /// Telemetry lines.
    pub fn telemetry_lines(&self) -> Vec<String> {
        let end_time = self.test_spec.iter().map(|c| c.time_ms).max().unwrap_or(0);

        let mut lines = Vec::new();
        let mut time_ms = 0;
        while time_ms <= end_time {
            if let Some(command_set) = self
                .test_spec
                .iter()
                .filter(|command_set| command_set.time_ms <= time_ms)
                .last()
            {
                lines.push(Self::telemetry_line(time_ms, command_set));
            }

            time_ms += JIG_SAMPLE_PERIOD_MS;
        }

        lines
    }

    /// Get the telemetry line of the command set.
    ///
    /// # Arguments
    /// * `time_ms` - Time in millisecond.
    /// * `command_set` - Active command set.
    ///
    /// # Returns
    /// time_us,top_rpm,bot_rpm,v_bat,i_bat,i_top,i_bot,thrust_N,torque_Nm
    fn telemetry_line(time_ms: u64, command_set: &CommandSet) -> String {
        let top_rpm = command_set.top_percent * JIG_RPM_PER_PERCENT;
        let bottom_rpm = command_set.bottom_percent * JIG_RPM_PER_PERCENT;

        let top_current = command_set.top_percent * JIG_CURRENT_PER_PERCENT;
        let bottom_current = command_set.bottom_percent * JIG_CURRENT_PER_PERCENT;
        let battery_current = top_current + bottom_current + JIG_IDLE_CURRENT;
        let battery_voltage = JIG_BATTERY_VOLTAGE - JIG_BATTERY_RESISTANCE * battery_current;

        let thrust = JIG_THRUST_COEFFICIENT * (top_rpm.powi(2) + bottom_rpm.powi(2));
        let torque = JIG_TORQUE_COEFFICIENT * (top_rpm.powi(2) - bottom_rpm.powi(2));

        format!(
            "{},{:.0},{:.0},{:.3},{:.3},{:.3},{:.3},{:.4},{:.5}",
            time_ms * 1000,
            top_rpm,
            bottom_rpm,
            battery_voltage,
            battery_current,
            top_current,
            bottom_current,
            thrust,
            torque
        )
    }

    fn closed_error() -> JigError {
        JigError::Transport(String::from("mock jig is closed"))
    }
}

impl Default for MockJig {
    fn default() -> Self {
        Self::new()
    }
}

impl LineChannel for MockJig {
    fn set_read_timeout(&mut self, timeout: Duration) -> Result<(), JigError> {
        if self.is_closed {
            return Err(Self::closed_error());
        }

        self.timeout = timeout;
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> Result<(), JigError> {
        if self.is_closed {
            return Err(Self::closed_error());
        }

        self.received.push(String::from(line));
        self.process(line);

        Ok(())
    }

    fn read_line(&mut self) -> Result<String, JigError> {
        if self.is_closed {
            return Err(Self::closed_error());
        }

        self._outgoing
            .pop_front()
            .ok_or_else(|| JigError::Transport(String::from("mock jig read timed out")))
    }

    fn close(&mut self) {
        self.is_closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::enums::CommandField;

    fn load_spec(jig: &mut MockJig, commands: &[&str]) {
        jig.write_line(MARKER_TEST_SPEC).unwrap();
        jig.write_line(&CommandField::header()).unwrap();
        jig.write_line(MARKER_TEST_SPEC).unwrap();
        for command in commands {
            jig.write_line(command).unwrap();
        }
    }

    fn read_all(jig: &mut MockJig) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(line) = jig.read_line() {
            lines.push(line);
        }

        lines
    }

    #[test]
    fn test_new() {
        let mut jig = MockJig::new();

        assert_eq!(jig.read_line().unwrap(), "Thrust Jig Firmware Program");
        assert_eq!(jig.read_line().unwrap(), "Ready to load test spec");

        assert!(jig.read_line().unwrap_err().is_transport());
    }

    #[test]
    fn test_command_set_parse() {
        assert_eq!(
            CommandSet::parse("100,27.5,50,1500,1400"),
            Some(CommandSet {
                time_ms: 100,
                top_percent: 27.5,
                bottom_percent: 50.0,
                pitch_us: 1500,
                roll_us: 1400,
            })
        );

        assert!(CommandSet::parse("100,27.5,50,1500").is_none());
        assert!(CommandSet::parse("100,27.5,50,1500.5,1400").is_none());
        assert!(CommandSet::parse("time_ms,top,bottom,pitch,roll").is_none());
    }

    #[test]
    fn test_process_spec() {
        let mut jig = MockJig::new();

        // The second marker makes the firmware take the first command as the
        // header.
        load_spec(&mut jig, &["0,0,0,0,0", "0,10,0,0,0", "100,20,0,0,0"]);

        assert_eq!(jig.test_spec.len(), 2);
        assert_eq!(jig.test_spec[0].top_percent, 10.0);
        assert_eq!(jig.test_spec[1].time_ms, 100);

        assert_eq!(jig.received.len(), 6);
    }

    #[test]
    fn test_process_invalid_command() {
        let mut jig = MockJig::new();
        read_all(&mut jig);

        jig.write_line("hello").unwrap();
        load_spec(&mut jig, &["0,0,0,0,0", "bad"]);

        assert_eq!(read_all(&mut jig), vec!["Invalid command", "Invalid command"]);
    }

    #[test]
    fn test_process_invalid_state() {
        let mut jig = MockJig::new();
        read_all(&mut jig);

        load_spec(&mut jig, &["0,0,0,0,0"]);
        jig.write_line(REQUEST_RUN_TEST).unwrap();

        assert_eq!(read_all(&mut jig), vec!["Invalid state"]);
    }

    #[test]
    fn test_start_test() {
        let mut jig = MockJig::new().with_chatter(&["Motor armed"]);
        read_all(&mut jig);

        load_spec(&mut jig, &["0,0,0,0,0", "0,10,10,1500,1500", "50,0,0,1500,1500"]);
        jig.write_line(REQUEST_RUN_TEST).unwrap();

        let lines = read_all(&mut jig);

        assert_eq!(
            &lines[..5],
            &[
                "Setting up",
                "Ready",
                "Starting test",
                "Motor armed",
                "time_us,top_rpm,bot_rpm,v_bat,i_bat,i_top,i_bot,thrust_N,torque_Nm",
            ]
        );

        // Samples at 0, 10, ..., 50 ms.
        assert_eq!(lines.len(), 5 + 6 + 1);
        assert_eq!(lines[5], "0,800,800,12.440,3.200,1.500,1.500,0.3200,0.00000");
        assert_eq!(lines[10], "50000,0,0,12.590,0.200,0.000,0.000,0.0000,0.00000");
        assert_eq!(lines[11], "Test Stopped");

        assert_eq!(
            lines[..5]
                .iter()
                .filter(|line| ControlMessage::recognize(line).is_some())
                .count(),
            4
        );
    }

    #[test]
    fn test_start_test_timeout() {
        let mut jig = MockJig::new().with_timeout_after(2);
        read_all(&mut jig);

        load_spec(&mut jig, &["0,0,0,0,0", "0,10,10,1500,1500", "50,0,0,1500,1500"]);
        jig.write_line(REQUEST_RUN_TEST).unwrap();

        let lines = read_all(&mut jig);

        assert_eq!(lines.len(), 4 + 2);
        assert!(!lines.iter().any(|line| line.contains(COMPLETION_SUBSTRING)));
    }

    #[test]
    fn test_close() {
        let mut jig = MockJig::new();
        jig.close();

        assert!(jig.read_line().is_err());
        assert!(jig.write_line(MARKER_TEST_SPEC).is_err());
        assert!(jig.set_read_timeout(Duration::from_millis(1)).is_err());
    }
}
