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

use thiserror::Error;

#[derive(Debug, Error)]
pub enum JigError {
    // Catalogue lookup or persisted header mismatch.
    #[error("Unknown channel: {0}.")]
    UnknownChannel(String),
    // One malformed telemetry line.
    #[error("Failed to parse the line \"{line}\": {reason}.")]
    Parse { line: String, reason: String },
    // Timeout or closure of the byte channel.
    #[error("Transport failure: {0}.")]
    Transport(String),
    #[error("Invalid test plan: {0}.")]
    InvalidPlan(String),
    #[error("Persistence failure: {0}.")]
    Persistence(#[from] csv::Error),
}

impl JigError {
    /// Create a parse error.
    ///
    /// # Arguments
    /// * `line` - The offending line.
    /// * `reason` - Why the line was rejected.
    ///
    /// # Returns
    /// Parse error.
    pub fn parse(line: &str, reason: &str) -> Self {
        JigError::Parse {
            line: String::from(line),
            reason: String::from(reason),
        }
    }

    /// Check if the error is a transport failure.
    pub fn is_transport(&self) -> bool {
        matches!(self, JigError::Transport(_))
    }
}
