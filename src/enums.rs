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

use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, EnumIter, EnumString, IntoStaticStr, VariantNames};

/// Telemetry channel key. The discriminant is the position of the channel in
/// the catalogue and in every telemetry sample.
#[derive(
    Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy, EnumIter, AsRefStr, EnumString,
    VariantNames,
)]
#[repr(u8)]
pub enum ChannelKey {
    #[strum(serialize = "time_ms")]
    TimeMs,
    #[strum(serialize = "top_motor_rpm")]
    TopMotorRpm,
    #[strum(serialize = "bottom_motor_rpm")]
    BottomMotorRpm,
    #[strum(serialize = "batt_voltage_V")]
    BattVoltage,
    #[strum(serialize = "batt_current_A")]
    BattCurrent,
    #[strum(serialize = "top_current_A")]
    TopCurrent,
    #[strum(serialize = "bottom_current_A")]
    BottomCurrent,
    #[strum(serialize = "thrust_N")]
    Thrust,
    #[strum(serialize = "torque_N")]
    Torque,
}

impl ChannelKey {
    /// Get the index of the channel in a telemetry sample.
    ///
    /// # Returns
    /// 0-based index.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Control messages emitted by the jig firmware. They are recognized by exact
/// match and never ingested as telemetry.
#[derive(Debug, PartialEq, Eq, Clone, Copy, EnumIter, AsRefStr)]
pub enum ControlMessage {
    #[strum(serialize = "Thrust Jig Firmware Program")]
    Banner,
    #[strum(serialize = "Ready to load test spec")]
    ReadyToLoad,
    #[strum(serialize = "Setting up")]
    SettingUp,
    #[strum(serialize = "Ready")]
    Ready,
    #[strum(serialize = "Starting test")]
    Starting,
    #[strum(serialize = "time_us,top_rpm,bot_rpm,v_bat,i_bat,i_top,i_bot,thrust_N,torque_Nm")]
    TelemetryHeader,
    #[strum(serialize = "Invalid command")]
    InvalidCommand,
    #[strum(serialize = "Invalid state")]
    InvalidState,
}

impl ControlMessage {
    /// Recognize a control message.
    ///
    /// # Arguments
    /// * `line` - Received line without the terminator.
    ///
    /// # Returns
    /// The control message if the line matches one exactly. Otherwise, None.
    pub fn recognize(line: &str) -> Option<ControlMessage> {
        ControlMessage::iter().find(|message| message.as_ref() == line)
    }

    /// The firmware rejected something the driver sent.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            ControlMessage::InvalidCommand | ControlMessage::InvalidState
        )
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, AsRefStr)]
pub enum DriverState {
    Idle,
    SpecLoading,
    SpecLoaded,
    Arming,
    Running,
    Stopped,
    Failed,
}

impl DriverState {
    /// Check if the state is terminal.
    ///
    /// # Returns
    /// True if no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DriverState::Stopped | DriverState::Failed)
    }
}

/// Fields of a command line in the test spec, in wire order.
#[derive(Debug, PartialEq, Clone, Copy, EnumIter, AsRefStr, IntoStaticStr)]
pub enum CommandField {
    #[strum(serialize = "time_ms")]
    TimeMs,
    #[strum(serialize = "top_throttle")]
    TopThrottle,
    #[strum(serialize = "bottom_throttle")]
    BottomThrottle,
    #[strum(serialize = "pitch_us")]
    PitchUs,
    #[strum(serialize = "roll_us")]
    RollUs,
}

impl CommandField {
    /// Get the header line of the test spec.
    ///
    /// # Returns
    /// Comma-joined field names.
    pub fn header() -> String {
        CommandField::iter()
            .map(<&'static str>::from)
            .collect::<Vec<&str>>()
            .join(",")
    }
}

/// Actuator targets a test step can change.
#[derive(Debug, PartialEq, Clone, Copy, EnumIter, AsRefStr, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Actuator {
    TopThrottle,
    BottomThrottle,
    PitchAngle,
    RollAngle,
}

impl Actuator {
    /// Check if the actuator is a motor throttle in percent.
    pub fn is_throttle(&self) -> bool {
        matches!(self, Actuator::TopThrottle | Actuator::BottomThrottle)
    }
}
