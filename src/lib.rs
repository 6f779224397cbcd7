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

//! # Thrust Jig Runner
//!
//! This library compiles the test plans of the dual-motor thrust jig into
//! time-stamped commands, drives the handshake with the jig firmware over a
//! serial link, and collects the streamed telemetry into a table that can be
//! saved and reloaded.
pub mod application;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod interface;
pub mod mock;
pub mod plan;
pub mod protocol;
pub mod session;
pub mod telemetry;
pub mod utility;
