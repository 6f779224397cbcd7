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

use std::str::FromStr;

use crate::constants::NUM_CHANNELS;
use crate::enums::ChannelKey;
use crate::error::JigError;

/// Unit conversion applied to a raw telemetry value.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Conversion {
    Identity,
    Divide(f64),
}

impl Conversion {
    /// Apply the conversion.
    ///
    /// # Arguments
    /// * `raw` - Raw value read from the wire.
    ///
    /// # Returns
    /// Converted value.
    pub fn apply(&self, raw: f64) -> f64 {
        match self {
            Conversion::Identity => raw,
            Conversion::Divide(divisor) => raw / divisor,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Channel {
    pub key: ChannelKey,
    // 0-based position in the telemetry line.
    pub wire_index: usize,
    pub conversion: Conversion,
    // Column header of the persisted table. Renaming a label breaks the
    // reload of previously saved files.
    pub display_label: &'static str,
}

impl Channel {
    /// Convert the raw value of this channel.
    pub fn convert(&self, raw: f64) -> f64 {
        self.conversion.apply(raw)
    }
}

/// Channel catalogue, ordered by the channel key.
pub const CHANNELS: [Channel; NUM_CHANNELS] = [
    Channel {
        key: ChannelKey::TimeMs,
        wire_index: 0,
        // Microseconds to milliseconds.
        conversion: Conversion::Divide(1000.0),
        display_label: "Time (ms)",
    },
    Channel {
        key: ChannelKey::TopMotorRpm,
        wire_index: 1,
        conversion: Conversion::Identity,
        display_label: "Top Motor Speed (rpm)",
    },
    Channel {
        key: ChannelKey::BottomMotorRpm,
        wire_index: 2,
        conversion: Conversion::Identity,
        display_label: "Bottom Motor Speed (rpm)",
    },
    Channel {
        key: ChannelKey::BattVoltage,
        wire_index: 3,
        conversion: Conversion::Identity,
        display_label: "Battery Voltage (V)",
    },
    Channel {
        key: ChannelKey::BattCurrent,
        wire_index: 4,
        conversion: Conversion::Identity,
        display_label: "Battery Current (A)",
    },
    Channel {
        key: ChannelKey::TopCurrent,
        wire_index: 5,
        conversion: Conversion::Identity,
        display_label: "Top Motor Current (A)",
    },
    Channel {
        key: ChannelKey::BottomCurrent,
        wire_index: 6,
        conversion: Conversion::Identity,
        display_label: "Bottom Motor Current (A)",
    },
    Channel {
        key: ChannelKey::Thrust,
        wire_index: 7,
        conversion: Conversion::Identity,
        display_label: "Thrust (N)",
    },
    Channel {
        key: ChannelKey::Torque,
        wire_index: 8,
        conversion: Conversion::Identity,
        display_label: "Torque (N)",
    },
];

impl ChannelKey {
    /// Get the catalogue entry of the channel.
    pub fn channel(&self) -> &'static Channel {
        &CHANNELS[self.index()]
    }
}

/// Look up a channel by its key name.
///
/// # Arguments
/// * `key` - Key name, e.g. "thrust_N".
///
/// # Returns
/// Catalogue entry, or UnknownChannel.
pub fn find_channel(key: &str) -> Result<&'static Channel, JigError> {
    ChannelKey::from_str(key)
        .map(|channel_key| channel_key.channel())
        .map_err(|_| JigError::UnknownChannel(String::from(key)))
}

/// Look up a channel key by its display label. This is the inverse mapping
/// used when a persisted table is reloaded.
///
/// # Arguments
/// * `label` - Display label, e.g. "Thrust (N)".
///
/// # Returns
/// Channel key, or UnknownChannel.
pub fn key_from_label(label: &str) -> Result<ChannelKey, JigError> {
    CHANNELS
        .iter()
        .find(|channel| channel.display_label == label)
        .map(|channel| channel.key)
        .ok_or_else(|| JigError::UnknownChannel(String::from(label)))
}

/// Number of fields a telemetry line must have at least.
pub fn required_field_count() -> usize {
    CHANNELS
        .iter()
        .map(|channel| channel.wire_index)
        .max()
        .map_or(0, |index| index + 1)
}
