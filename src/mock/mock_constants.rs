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

// Telemetry sample period of the simulated jig in millisecond.
pub const JIG_SAMPLE_PERIOD_MS: u64 = 10;

pub const JIG_RPM_PER_PERCENT: f64 = 80.0;

// Thrust and torque in N and Nm per rpm^2. The motors are counter-rotating so
// their torques cancel.
pub const JIG_THRUST_COEFFICIENT: f64 = 2.5e-7;
pub const JIG_TORQUE_COEFFICIENT: f64 = 4.0e-9;

pub const JIG_CURRENT_PER_PERCENT: f64 = 0.15;
pub const JIG_IDLE_CURRENT: f64 = 0.2;

pub const JIG_BATTERY_VOLTAGE: f64 = 12.6;
pub const JIG_BATTERY_RESISTANCE: f64 = 0.05;
