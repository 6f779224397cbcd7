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

use crate::plan::test_step::TestStep;

/// Fully resolved actuator state starting at time_ms.
#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub struct TestCommand {
    pub time_ms: u64,
    pub duration_ms: u64,
    pub top_throttle: f64,
    pub bottom_throttle: f64,
    pub pitch_angle: f64,
    pub roll_angle: f64,
}

impl TestCommand {
    /// The rest state at time 0: all the actuators are 0.
    pub fn rest() -> Self {
        Self::default()
    }

    /// Resolve the next command from a step.
    ///
    /// # Arguments
    /// * `step` - Test step.
    ///
    /// # Returns
    /// Command that starts when this one ends. The targets not specified in
    /// the step keep the values of this command.
    pub fn next(&self, step: &TestStep) -> Self {
        Self {
            time_ms: self.time_ms + self.duration_ms,
            duration_ms: step.duration_ms(),
            top_throttle: step.top_throttle.resolve(self.top_throttle),
            bottom_throttle: step.bottom_throttle.resolve(self.bottom_throttle),
            pitch_angle: step.pitch_angle.resolve(self.pitch_angle),
            roll_angle: step.roll_angle.resolve(self.roll_angle),
        }
    }

    /// Check if both motors are at zero throttle.
    pub fn is_de_energized(&self) -> bool {
        self.top_throttle == 0.0 && self.bottom_throttle == 0.0
    }

    /// Get the line of the test spec. The pitch and roll are sent as whole
    /// microseconds since the firmware reads them as integers.
    ///
    /// # Returns
    /// time_ms,top_throttle,bottom_throttle,pitch_us,roll_us
    pub fn to_wire_line(&self) -> String {
        format!(
            "{},{},{},{:.0},{:.0}",
            self.time_ms, self.top_throttle, self.bottom_throttle, self.pitch_angle, self.roll_angle
        )
    }
}
