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

use crate::constants::TEARDOWN_THROTTLE_DECREMENT;
use crate::plan::test_command::TestCommand;
use crate::plan::test_plan::TestPlan;
use crate::plan::test_step::TestStep;

/// Compile the test plan into the resolved command sequence.
///
/// The sequence starts with the rest command at time 0. Each step starts when
/// the previous command ends and carries the targets it does not specify.
/// With the teardown, 20 ms steps that lower both throttles by 1 (clamped at
/// 0) are appended until both throttles are 0.
///
/// # Arguments
/// * `plan` - Test plan.
/// * `teardown` - Append the teardown ramp or not.
///
/// # Returns
/// Commands with non-decreasing time.
pub fn compile(plan: &TestPlan, teardown: bool) -> Vec<TestCommand> {
    let mut commands = vec![TestCommand::rest()];
    for step in plan.steps() {
        let next = last_command(&commands).next(step);
        commands.push(next);
    }

    if teardown {
        let number_of_steps = commands.len();
        while !last_command(&commands).is_de_energized() {
            let last = last_command(&commands);
            let next = last.next(&teardown_step(last));
            commands.push(next);
        }

        debug!(
            "Plan {} has {} teardown commands.",
            plan.name,
            commands.len() - number_of_steps
        );
    }

    commands
}

fn last_command(commands: &[TestCommand]) -> &TestCommand {
    // The rest command is always there.
    &commands[commands.len() - 1]
}

/// Step that lowers both throttles by one decrement and holds pitch and roll.
fn teardown_step(last: &TestCommand) -> TestStep {
    TestStep::teardown(
        lower_throttle(last.top_throttle),
        lower_throttle(last.bottom_throttle),
    )
}

fn lower_throttle(throttle: f64) -> f64 {
    (throttle - TEARDOWN_THROTTLE_DECREMENT).max(0.0)
}
