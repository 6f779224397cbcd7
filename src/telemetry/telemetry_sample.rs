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

use crate::constants::NUM_CHANNELS;
use crate::enums::ChannelKey;

/// One telemetry row with the converted value of every channel.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct TelemetrySample {
    // Indexed by the channel key.
    _values: [f64; NUM_CHANNELS],
}

impl TelemetrySample {
    /// Create a new telemetry sample.
    ///
    /// # Arguments
    /// * `values` - Converted values indexed by the channel key.
    ///
    /// # Returns
    /// A new telemetry sample.
    pub fn new(values: [f64; NUM_CHANNELS]) -> Self {
        Self { _values: values }
    }

    /// Get the value of a channel.
    pub fn get(&self, key: ChannelKey) -> f64 {
        self._values[key.index()]
    }

    /// Get the time of the sample in millisecond.
    pub fn time_ms(&self) -> f64 {
        self.get(ChannelKey::TimeMs)
    }

    /// Get all the values indexed by the channel key.
    pub fn values(&self) -> &[f64; NUM_CHANNELS] {
        &self._values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get() {
        let sample = TelemetrySample::new([12.0, 4000.0, 3900.0, 12.1, 3.2, 1.1, 1.2, 0.5, 0.02]);

        assert_eq!(sample.time_ms(), 12.0);
        assert_eq!(sample.get(ChannelKey::BottomMotorRpm), 3900.0);
        assert_eq!(sample.get(ChannelKey::Torque), 0.02);
        assert_eq!(sample.values().len(), NUM_CHANNELS);
    }
}
