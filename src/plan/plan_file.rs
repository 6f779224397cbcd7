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

use config::Config;
use log::info;
use serde::Deserialize;
use std::path::Path;

use crate::error::JigError;
use crate::plan::test_plan::TestPlan;
use crate::plan::test_step::{Target, TestStep};

#[derive(Deserialize, Debug)]
struct StepEntry {
    duration_ms: u64,
    top_throttle: Option<f64>,
    bottom_throttle: Option<f64>,
    pitch_angle: Option<f64>,
    roll_angle: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct PlanEntry {
    name: String,
    #[serde(default)]
    steps: Vec<StepEntry>,
}

impl StepEntry {
    /// Convert to the test step. The absent targets are carried.
    fn to_step(&self) -> Result<TestStep, JigError> {
        let mut step = TestStep::new(self.duration_ms)?;
        step.top_throttle = Target::from(self.top_throttle);
        step.bottom_throttle = Target::from(self.bottom_throttle);
        step.pitch_angle = Target::from(self.pitch_angle);
        step.roll_angle = Target::from(self.roll_angle);

        Ok(step)
    }
}

/// Read the test plan from a file.
///
/// # Arguments
/// * `filepath` - Path of the plan file. The format is decided by the
/// extension, normally YAML.
///
/// # Returns
/// Test plan, or InvalidPlan if the file can not be read or a step is
/// invalid.
pub fn read_plan_file(filepath: &Path) -> Result<TestPlan, JigError> {
    let entry: PlanEntry = Config::builder()
        .add_source(config::File::from(filepath))
        .build()
        .and_then(|config| config.try_deserialize())
        .map_err(|error| JigError::InvalidPlan(format!("{:?}: {error}", filepath)))?;

    let steps = entry
        .steps
        .iter()
        .enumerate()
        .map(|(idx, step)| {
            step.to_step().map_err(|error| match error {
                JigError::InvalidPlan(reason) => {
                    JigError::InvalidPlan(format!("step {idx}: {reason}"))
                }
                other => other,
            })
        })
        .collect::<Result<Vec<TestStep>, JigError>>()?;

    let plan = TestPlan::new(&entry.name, steps)?;

    info!(
        "Read the test plan {} with {} steps ({} ms).",
        plan.name,
        plan.steps().len(),
        plan.duration_ms()
    );

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs::write;
    use tempfile::tempdir;

    #[test]
    fn test_read_plan_file_ramp() {
        let plan = read_plan_file(Path::new("config/plans/bottom_ramp.yaml")).unwrap();

        assert_eq!(plan.name, "bottom_ramp");
        assert_eq!(plan.steps().len(), 20);
        assert_eq!(plan.duration_ms(), 2000);

        assert_eq!(plan.steps()[0].bottom_throttle, Target::Specified(0.0));
        assert_eq!(plan.steps()[19].bottom_throttle, Target::Specified(19.0));
        assert_eq!(plan.steps()[19].top_throttle, Target::Carried);
    }

    #[test]
    fn test_read_plan_file_hover() {
        let plan = read_plan_file(Path::new("config/plans/coaxial_hover.yaml")).unwrap();

        assert_eq!(plan.name, "coaxial_hover");
        assert_eq!(plan.steps().len(), 5);

        let step = plan.steps()[1];
        assert_eq!(step.duration_ms(), 1000);
        assert_eq!(step.top_throttle, Target::Specified(25.0));
        assert_eq!(step.bottom_throttle, Target::Specified(27.5));
        assert_eq!(step.pitch_angle, Target::Carried);

        let step = plan.steps()[2];
        assert_eq!(step.pitch_angle, Target::Specified(1600.0));
        assert_eq!(step.top_throttle, Target::Carried);
    }

    #[test]
    fn test_read_plan_file_zero_duration() {
        let dir = tempdir().unwrap();
        let filepath = dir.path().join("plan.yaml");
        write(
            &filepath,
            "name: bad\nsteps:\n  - {duration_ms: 100, top_throttle: 1}\n  - {duration_ms: 0}\n",
        )
        .unwrap();

        let error = read_plan_file(&filepath).unwrap_err();

        assert!(matches!(
            &error,
            JigError::InvalidPlan(message) if message == "step 1: the step duration should be positive"
        ));
        assert_eq!(
            error.to_string(),
            "Invalid test plan: step 1: the step duration should be positive."
        );
    }

    #[test]
    fn test_read_plan_file_throttle_out_of_range() {
        let dir = tempdir().unwrap();
        let filepath = dir.path().join("plan.yaml");
        write(
            &filepath,
            "name: bad\nsteps:\n  - {duration_ms: 100, top_throttle: 150}\n",
        )
        .unwrap();

        assert!(matches!(
            read_plan_file(&filepath),
            Err(JigError::InvalidPlan(message)) if message == "step 0 has the top_throttle 150 out of [0, 100]"
        ));
    }

    #[test]
    fn test_read_plan_file_missing() {
        assert!(matches!(
            read_plan_file(Path::new("config/plans/missing.yaml")),
            Err(JigError::InvalidPlan(_))
        ));
    }
}
