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

use log::{info, warn};
use std::path::Path;

use crate::error::JigError;
use crate::interface::line_channel::LineChannel;
use crate::plan::compiler::compile;
use crate::plan::test_plan::TestPlan;
use crate::protocol::driver::{ProtocolDriver, RunReport};
use crate::telemetry::telemetry_table::TelemetryTable;

/// Outcome of a session.
#[derive(Debug)]
pub enum SessionOutcome {
    // Table reloaded from the persistence path. No run happened.
    Loaded(TelemetryTable),
    // New run on the jig.
    Executed(RunReport),
}

impl SessionOutcome {
    /// Get the telemetry table of the session.
    pub fn table(&self) -> &TelemetryTable {
        match self {
            SessionOutcome::Loaded(table) => table,
            SessionOutcome::Executed(report) => &report.table,
        }
    }
}

/// Run one session. If the persistence path already holds a table with at
/// least one sample, it is loaded and the jig is not touched. Otherwise the
/// plan is compiled and executed, and the telemetry, if any, is saved to the
/// persistence path.
///
/// # Arguments
/// * `plan` - Test plan.
/// * `teardown` - Append the teardown ramp or not.
/// * `channel` - Byte channel to the jig.
/// * `filepath` - Persistence path.
///
/// # Returns
/// Session outcome. A failed run is reported in the run report. Only the
/// failure to reload an existing table is an error.
pub fn run_session<C: LineChannel>(
    plan: &TestPlan,
    teardown: bool,
    channel: &mut C,
    filepath: Option<&Path>,
) -> Result<SessionOutcome, JigError> {
    if let Some(path) = filepath {
        if path.is_file() {
            let table = TelemetryTable::load(path)?;
            if !table.is_empty() {
                info!("Reuse the telemetry in {:?} instead of a new run.", path);
                return Ok(SessionOutcome::Loaded(table));
            }

            warn!("No telemetry in {:?}. Run the plan again.", path);
        }
    }

    let commands = compile(plan, teardown);
    info!(
        "Compiled the plan {} into {} commands over {} ms.",
        plan.name,
        commands.len(),
        commands.last().map_or(0, |command| command.time_ms)
    );

    let report = ProtocolDriver::new(channel).execute(&commands);
    if report.dropped_lines > 0 {
        warn!("Dropped {} telemetry lines.", report.dropped_lines);
    }

    if let Some(path) = filepath {
        if report.table.is_empty() {
            warn!("No telemetry to save to {:?}.", path);
        } else {
            report.table.save_or_warn(path);
        }
    }

    Ok(SessionOutcome::Executed(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use std::fs::write;
    use tempfile::tempdir;

    use crate::enums::{Actuator, ChannelKey, DriverState};
    use crate::mock::mock_jig::MockJig;

    fn create_plan() -> TestPlan {
        TestPlan::ramp("ramp", Actuator::TopThrottle, &[10.0, 20.0], 100).unwrap()
    }

    #[test]
    fn test_run_session() {
        let mut jig = MockJig::new();

        let outcome = run_session(&create_plan(), true, &mut jig, None).unwrap();

        let report = match outcome {
            SessionOutcome::Executed(report) => report,
            SessionOutcome::Loaded(_) => panic!("Should run the jig"),
        };

        assert!(report.is_complete());
        assert!(report.failure.is_none());
        assert_eq!(report.dropped_lines, 0);
        assert_eq!(report.rejections, 0);

        // Rest + 2 steps + 20 teardown steps. The jig drops the rest command
        // and the last command starts at 200 + 19 * 20 = 580 ms.
        assert_eq!(jig.test_spec.len(), 22);
        assert_eq!(report.table.len(), 59);

        let times = report.table.times();
        assert_relative_eq!(times[0], 0.0);
        assert_relative_eq!(times[58], 580.0);

        // 20% top throttle at 150 ms
        assert_relative_eq!(report.table.column(ChannelKey::TopMotorRpm)[15], 1600.0);
        assert_relative_eq!(report.table.column(ChannelKey::TopMotorRpm)[58], 0.0);
    }

    #[test]
    fn test_run_session_save() {
        let dir = tempdir().unwrap();
        let filepath = dir.path().join("run.csv");

        let mut jig = MockJig::new();
        let outcome = run_session(&create_plan(), false, &mut jig, Some(&filepath)).unwrap();

        assert!(filepath.is_file());
        assert_eq!(&TelemetryTable::load(&filepath).unwrap(), outcome.table());
    }

    #[test]
    fn test_run_session_load() {
        let dir = tempdir().unwrap();
        let filepath = dir.path().join("run.csv");

        let mut jig_first = MockJig::new();
        let first = run_session(&create_plan(), false, &mut jig_first, Some(&filepath)).unwrap();

        // The second session reuses the saved table.
        let mut jig_second = MockJig::new();
        let second = run_session(&create_plan(), false, &mut jig_second, Some(&filepath)).unwrap();

        assert!(matches!(second, SessionOutcome::Loaded(_)));
        assert_eq!(first.table(), second.table());
        assert!(jig_second.received.is_empty());
    }

    #[test]
    fn test_run_session_load_error() {
        let dir = tempdir().unwrap();
        let filepath = dir.path().join("run.csv");
        write(&filepath, "Time (ms),Humidity (%)\n0,50\n").unwrap();

        let mut jig = MockJig::new();
        let result = run_session(&create_plan(), false, &mut jig, Some(&filepath));

        assert!(matches!(result, Err(JigError::UnknownChannel(_))));
        assert!(jig.received.is_empty());
    }

    #[test]
    fn test_run_session_timeout() {
        let dir = tempdir().unwrap();
        let filepath = dir.path().join("run.csv");

        let mut jig = MockJig::new().with_timeout_after(5);
        let outcome = run_session(&create_plan(), true, &mut jig, Some(&filepath)).unwrap();

        let report = match outcome {
            SessionOutcome::Executed(report) => report,
            SessionOutcome::Loaded(_) => panic!("Should run the jig"),
        };

        assert_eq!(report.state, DriverState::Failed);
        assert!(report.failure.as_ref().unwrap().is_transport());
        assert_eq!(report.table.len(), 5);
        assert!(jig.is_closed);

        // The partial telemetry is still saved.
        assert_eq!(TelemetryTable::load(&filepath).unwrap().len(), 5);
    }

    #[test]
    fn test_run_session_retry_after_failure() {
        let dir = tempdir().unwrap();
        let filepath = dir.path().join("run.csv");

        // No sample before the failure.
        let mut jig_failed = MockJig::new().with_timeout_after(0);
        let first = run_session(&create_plan(), false, &mut jig_failed, Some(&filepath)).unwrap();

        assert!(first.table().is_empty());
        assert!(!filepath.exists());

        // Restarting the session runs the jig again.
        let mut jig = MockJig::new();
        let second = run_session(&create_plan(), false, &mut jig, Some(&filepath)).unwrap();

        assert!(matches!(second, SessionOutcome::Executed(ref report) if report.is_complete()));
        assert!(!jig.received.is_empty());
        assert_eq!(TelemetryTable::load(&filepath).unwrap().len(), 11);
    }

    #[test]
    fn test_run_session_header_only_file() {
        let dir = tempdir().unwrap();
        let filepath = dir.path().join("run.csv");
        TelemetryTable::default().save(&filepath).unwrap();

        let mut jig = MockJig::new();
        let outcome = run_session(&create_plan(), false, &mut jig, Some(&filepath)).unwrap();

        // A file without samples is not a saved run.
        assert!(matches!(outcome, SessionOutcome::Executed(_)));
        assert_eq!(TelemetryTable::load(&filepath).unwrap().len(), 11);
    }

    #[test]
    fn test_run_session_chatter() {
        let mut jig = MockJig::new().with_chatter(&["ESC calibrated", "", "Invalid command"]);

        let outcome = run_session(&create_plan(), false, &mut jig, None).unwrap();

        let report = match outcome {
            SessionOutcome::Executed(report) => report,
            SessionOutcome::Loaded(_) => panic!("Should run the jig"),
        };

        assert!(report.is_complete());
        assert_eq!(report.dropped_lines, 1);
        assert_eq!(report.rejections, 1);
        assert_eq!(report.table.len(), 11);
    }

    #[test]
    fn test_run_session_save_failure() {
        let dir = tempdir().unwrap();
        let filepath = dir.path().join("no_such_dir").join("run.csv");

        let mut jig = MockJig::new();
        let outcome = run_session(&create_plan(), false, &mut jig, Some(&filepath)).unwrap();

        assert!(!filepath.exists());
        assert_eq!(outcome.table().len(), 11);
    }
}
