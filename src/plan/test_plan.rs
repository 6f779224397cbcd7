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

use crate::constants::{THROTTLE_MAX_PERCENT, THROTTLE_MIN_PERCENT};
use crate::enums::Actuator;
use crate::error::JigError;
use crate::plan::test_step::{Target, TestStep};

/// Ordered test steps authored for one run.
#[derive(Debug, PartialEq, Clone)]
pub struct TestPlan {
    pub name: String,
    _steps: Vec<TestStep>,
}

impl TestPlan {
    /// Create a new test plan.
    ///
    /// # Arguments
    /// * `name` - Name of the plan.
    /// * `steps` - Ordered test steps.
    ///
    /// # Returns
    /// A new test plan, or InvalidPlan if a specified target is not finite or
    /// a throttle is out of the range of the motor driver.
    pub fn new(name: &str, steps: Vec<TestStep>) -> Result<Self, JigError> {
        for (idx, step) in steps.iter().enumerate() {
            for actuator in Actuator::iter() {
                Self::validate_target(idx, actuator, step.target(actuator))?;
            }
        }

        Ok(Self {
            name: String::from(name),
            _steps: steps,
        })
    }

    /// Create a ramp plan that holds each level of one actuator for the same
    /// duration.
    ///
    /// # Arguments
    /// * `name` - Name of the plan.
    /// * `actuator` - Actuator to ramp.
    /// * `levels` - Levels in order.
    /// * `duration_ms` - Duration of each level in millisecond.
    ///
    /// # Returns
    /// A new test plan.
    pub fn ramp(
        name: &str,
        actuator: Actuator,
        levels: &[f64],
        duration_ms: u64,
    ) -> Result<Self, JigError> {
        let steps = levels
            .iter()
            .map(|level| TestStep::new(duration_ms).map(|step| step.with(actuator, *level)))
            .collect::<Result<Vec<TestStep>, JigError>>()?;

        Self::new(name, steps)
    }

    /// Validate the target of an actuator. The teardown only terminates for a
    /// bounded throttle.
    fn validate_target(idx: usize, actuator: Actuator, target: Target) -> Result<(), JigError> {
        if !target.is_finite() {
            return Err(JigError::InvalidPlan(format!(
                "step {idx} has a non-finite {}",
                actuator.as_ref()
            )));
        }

        if let Target::Specified(value) = target {
            if actuator.is_throttle()
                && !(THROTTLE_MIN_PERCENT..=THROTTLE_MAX_PERCENT).contains(&value)
            {
                return Err(JigError::InvalidPlan(format!(
                    "step {idx} has the {} {value} out of [{THROTTLE_MIN_PERCENT}, {THROTTLE_MAX_PERCENT}]",
                    actuator.as_ref()
                )));
            }
        }

        Ok(())
    }

    pub fn steps(&self) -> &[TestStep] {
        &self._steps
    }

    /// Total duration of the authored steps in millisecond.
    pub fn duration_ms(&self) -> u64 {
        self._steps.iter().map(|step| step.duration_ms()).sum()
    }
}
