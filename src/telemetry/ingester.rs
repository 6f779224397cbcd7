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

use crate::constants::NUM_CHANNELS;
use crate::error::JigError;
use crate::telemetry::channel::{required_field_count, CHANNELS};
use crate::telemetry::telemetry_sample::TelemetrySample;

/// Ingest one telemetry line.
///
/// # Arguments
/// * `line` - Comma-separated raw values without the terminator.
///
/// # Returns
/// Telemetry sample with the converted values, or a parse error if the line
/// has too few fields or a required field is not a finite number.
pub fn ingest_line(line: &str) -> Result<TelemetrySample, JigError> {
    let fields: Vec<&str> = line.split(',').collect();

    let required = required_field_count();
    if fields.len() < required {
        return Err(JigError::parse(
            line,
            &format!("expected {required} fields, got {}", fields.len()),
        ));
    }

    let mut values = [0.0; NUM_CHANNELS];
    for channel in CHANNELS.iter() {
        let field = fields[channel.wire_index].trim();
        let raw = field.parse::<f64>().map_err(|_| {
            JigError::parse(
                line,
                &format!("{} is not numeric: \"{field}\"", channel.key.as_ref()),
            )
        })?;
        if !raw.is_finite() {
            return Err(JigError::parse(
                line,
                &format!("{} is not finite: \"{field}\"", channel.key.as_ref()),
            ));
        }

        values[channel.key.index()] = channel.convert(raw);
    }

    debug!("Ingested: {line}.");

    Ok(TelemetrySample::new(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::enums::ChannelKey;
    use crate::utility::assert_relative_eq_vector;

    #[test]
    fn test_ingest_line() {
        let sample = ingest_line("12000,4000,4000,12.1,3.2,1.1,1.1,0.5,0.02").unwrap();

        assert_relative_eq!(sample.time_ms(), 12.0);
        assert_relative_eq_vector(
            sample.values(),
            &[12.0, 4000.0, 4000.0, 12.1, 3.2, 1.1, 1.1, 0.5, 0.02],
            1e-12,
        );
        assert_relative_eq!(sample.get(ChannelKey::Torque), 0.02);
    }

    #[test]
    fn test_ingest_line_extra_fields() {
        // Fields beyond the catalogue are ignored.
        let sample = ingest_line("1000,1,2,3,4,5,6,7,8,99").unwrap();

        assert_relative_eq!(sample.time_ms(), 1.0);
        assert_relative_eq!(sample.get(ChannelKey::Torque), 8.0);
    }

    #[test]
    fn test_ingest_line_whitespace() {
        let sample = ingest_line("1000, 1, 2, 3, 4, 5, 6, 7, 8").unwrap();

        assert_relative_eq!(sample.get(ChannelKey::TopMotorRpm), 1.0);
    }

    #[test]
    fn test_ingest_line_too_few_fields() {
        let result = ingest_line("12000,4000,4000");

        assert!(matches!(
            result,
            Err(JigError::Parse { ref reason, .. }) if reason == "expected 9 fields, got 3"
        ));

        assert!(ingest_line("").is_err());
    }

    #[test]
    fn test_ingest_line_not_numeric() {
        let result = ingest_line("12000,4000,abc,12.1,3.2,1.1,1.1,0.5,0.02");

        assert!(matches!(
            result,
            Err(JigError::Parse { ref reason, .. })
                if reason == "bottom_motor_rpm is not numeric: \"abc\""
        ));

        // Stray firmware text is rejected as well.
        assert!(ingest_line("Motor armed").is_err());
    }

    #[test]
    fn test_ingest_line_not_finite() {
        let result = ingest_line("12000,4000,4000,12.1,3.2,1.1,1.1,NaN,0.02");

        assert!(matches!(
            result,
            Err(JigError::Parse { ref reason, .. }) if reason == "thrust_N is not finite: \"NaN\""
        ));

        assert!(ingest_line("inf,4000,4000,12.1,3.2,1.1,1.1,0.5,0.02").is_err());
        assert!(ingest_line("12000,4000,4000,12.1,3.2,1.1,1.1,0.5,-infinity").is_err());
    }
}
