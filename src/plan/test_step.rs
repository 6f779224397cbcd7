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

use crate::constants::TEARDOWN_STEP_MS;
use crate::enums::Actuator;
use crate::error::JigError;

/// Actuator target of a test step.
#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub enum Target {
    Specified(f64),
    // Keep the value resolved by the previous command.
    #[default]
    Carried,
}

impl Target {
    /// Resolve the target against the previous value.
    ///
    /// # Arguments
    /// * `previous` - Value resolved by the previous command.
    ///
    /// # Returns
    /// The specified value, or the previous one if carried.
    pub fn resolve(&self, previous: f64) -> f64 {
        match self {
            Target::Specified(value) => *value,
            Target::Carried => previous,
        }
    }

    /// Check if the target is usable. A carried target always is.
    pub fn is_finite(&self) -> bool {
        match self {
            Target::Specified(value) => value.is_finite(),
            Target::Carried => true,
        }
    }
}

impl From<Option<f64>> for Target {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Target::Carried, Target::Specified)
    }
}

/// Sparse change of the actuators held for a duration. Every target that is
/// not specified is carried from the previous command.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct TestStep {
    _duration_ms: u64,
    pub top_throttle: Target,
    pub bottom_throttle: Target,
    pub pitch_angle: Target,
    pub roll_angle: Target,
}

impl TestStep {
    /// Create a new test step with all the targets carried.
    ///
    /// # Arguments
    /// * `duration_ms` - Duration in millisecond. Should be positive.
    ///
    /// # Returns
    /// A new test step, or InvalidPlan if the duration is 0.
    pub fn new(duration_ms: u64) -> Result<Self, JigError> {
        if duration_ms == 0 {
            return Err(JigError::InvalidPlan(String::from(
                "the step duration should be positive",
            )));
        }

        Ok(Self {
            _duration_ms: duration_ms,
            top_throttle: Target::Carried,
            bottom_throttle: Target::Carried,
            pitch_angle: Target::Carried,
            roll_angle: Target::Carried,
        })
    }

    /// Create a teardown step that sets both throttles and carries pitch and
    /// roll.
    ///
    /// # Arguments
    /// * `top_throttle` - Top throttle.
    /// * `bottom_throttle` - Bottom throttle.
    ///
    /// # Returns
    /// Teardown step.
    pub(crate) fn teardown(top_throttle: f64, bottom_throttle: f64) -> Self {
        Self {
            _duration_ms: TEARDOWN_STEP_MS,
            top_throttle: Target::Specified(top_throttle),
            bottom_throttle: Target::Specified(bottom_throttle),
            pitch_angle: Target::Carried,
            roll_angle: Target::Carried,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self._duration_ms
    }

    /// Specify the target of an actuator.
    ///
    /// # Arguments
    /// * `actuator` - Actuator.
    /// * `value` - Target value.
    ///
    /// # Returns
    /// The updated step.
    pub fn with(mut self, actuator: Actuator, value: f64) -> Self {
        *self.target_mut(actuator) = Target::Specified(value);
        self
    }

    pub fn with_top_throttle(self, value: f64) -> Self {
        self.with(Actuator::TopThrottle, value)
    }

    pub fn with_bottom_throttle(self, value: f64) -> Self {
        self.with(Actuator::BottomThrottle, value)
    }

    pub fn with_pitch_angle(self, value: f64) -> Self {
        self.with(Actuator::PitchAngle, value)
    }

    pub fn with_roll_angle(self, value: f64) -> Self {
        self.with(Actuator::RollAngle, value)
    }

    /// Get the target of an actuator.
    pub fn target(&self, actuator: Actuator) -> Target {
        match actuator {
            Actuator::TopThrottle => self.top_throttle,
            Actuator::BottomThrottle => self.bottom_throttle,
            Actuator::PitchAngle => self.pitch_angle,
            Actuator::RollAngle => self.roll_angle,
        }
    }

    fn target_mut(&mut self, actuator: Actuator) -> &mut Target {
        match actuator {
            Actuator::TopThrottle => &mut self.top_throttle,
            Actuator::BottomThrottle => &mut self.bottom_throttle,
            Actuator::PitchAngle => &mut self.pitch_angle,
            Actuator::RollAngle => &mut self.roll_angle,
        }
    }
}
