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

use csv::{ReaderBuilder, Writer};
use log::{info, warn};
use std::path::Path;
use strum::IntoEnumIterator;

use crate::constants::NUM_CHANNELS;
use crate::enums::ChannelKey;
use crate::error::JigError;
use crate::telemetry::channel::key_from_label;
use crate::telemetry::telemetry_sample::TelemetrySample;

/// Telemetry of one run. The table is frozen once created: samples keep their
/// arrival order and the time channel is the index.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct TelemetryTable {
    _samples: Vec<TelemetrySample>,
}

impl TelemetryTable {
    /// Freeze the accumulated samples into a table.
    ///
    /// # Arguments
    /// * `samples` - Samples in arrival order.
    ///
    /// # Returns
    /// Telemetry table.
    pub fn finalize(samples: Vec<TelemetrySample>) -> Self {
        Self { _samples: samples }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self._samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self._samples.is_empty()
    }

    /// Samples in arrival order.
    pub fn samples(&self) -> &[TelemetrySample] {
        &self._samples
    }

    /// Get the time index in millisecond.
    pub fn times(&self) -> Vec<f64> {
        self.column(ChannelKey::TimeMs)
    }

    /// Get all the values of a channel.
    ///
    /// # Arguments
    /// * `key` - Channel key.
    ///
    /// # Returns
    /// Values in arrival order.
    pub fn column(&self, key: ChannelKey) -> Vec<f64> {
        self._samples.iter().map(|sample| sample.get(key)).collect()
    }

    /// Get the values of a channel within a time window.
    ///
    /// # Arguments
    /// * `key` - Channel key.
    /// * `time_min` - Exclusive lower bound in millisecond. None means
    /// unbounded.
    /// * `time_max` - Inclusive upper bound in millisecond. None means
    /// unbounded.
    ///
    /// # Returns
    /// Values in arrival order whose time satisfies
    /// time_min < time <= time_max.
    pub fn window(
        &self,
        key: ChannelKey,
        time_min: Option<f64>,
        time_max: Option<f64>,
    ) -> Vec<f64> {
        self._samples
            .iter()
            .filter(|sample| {
                let time = sample.time_ms();
                time_min.map_or(true, |bound| time > bound)
                    && time_max.map_or(true, |bound| time <= bound)
            })
            .map(|sample| sample.get(key))
            .collect()
    }

    /// Save the table as CSV. The header row holds the display labels.
    ///
    /// # Arguments
    /// * `filepath` - Path of the CSV file.
    ///
    /// # Returns
    /// Result of the operation.
    pub fn save(&self, filepath: &Path) -> Result<(), JigError> {
        let mut writer = Writer::from_path(filepath)?;

        writer.write_record(ChannelKey::iter().map(|key| key.channel().display_label))?;
        for sample in &self._samples {
            writer.write_record(sample.values().iter().map(|value| value.to_string()))?;
        }

        writer.flush().map_err(csv::Error::from)?;

        info!(
            "Saved {} telemetry samples to {:?}.",
            self._samples.len(),
            filepath
        );

        Ok(())
    }

    /// Save the table and report a failure as a warning only. The table in
    /// memory stays valid and the caller can retry.
    ///
    /// # Arguments
    /// * `filepath` - Path of the CSV file.
    ///
    /// # Returns
    /// True if the table is saved.
    pub fn save_or_warn(&self, filepath: &Path) -> bool {
        match self.save(filepath) {
            Ok(()) => true,
            Err(error) => {
                warn!("Failed to save the telemetry to {:?}: {error}", filepath);
                false
            }
        }
    }

    /// Load a table saved by save(). Columns may be in any order but every
    /// channel must be present exactly once.
    ///
    /// # Arguments
    /// * `filepath` - Path of the CSV file.
    ///
    /// # Returns
    /// Telemetry table, or UnknownChannel for an unrecognized or missing
    /// header, or a parse/persistence error for bad rows.
    pub fn load(filepath: &Path) -> Result<Self, JigError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_path(filepath)?;

        let mut columns: Vec<ChannelKey> = Vec::with_capacity(NUM_CHANNELS);
        for label in reader.headers()?.iter() {
            let key = key_from_label(label)?;
            if columns.contains(&key) {
                return Err(JigError::UnknownChannel(format!("duplicated {label}")));
            }
            columns.push(key);
        }

        if let Some(missing) = ChannelKey::iter().find(|key| !columns.contains(key)) {
            return Err(JigError::UnknownChannel(format!(
                "missing {}",
                missing.channel().display_label
            )));
        }

        let mut samples = Vec::new();
        for result in reader.records() {
            let record = result?;

            let mut values = [0.0; NUM_CHANNELS];
            for (key, field) in columns.iter().zip(record.iter()) {
                let value = field.parse::<f64>().map_err(|_| {
                    JigError::parse(
                        &record.iter().collect::<Vec<&str>>().join(","),
                        &format!("{} is not numeric: \"{field}\"", key.as_ref()),
                    )
                })?;
                if !value.is_finite() {
                    return Err(JigError::parse(
                        &record.iter().collect::<Vec<&str>>().join(","),
                        &format!("{} is not finite: \"{field}\"", key.as_ref()),
                    ));
                }

                values[key.index()] = value;
            }

            samples.push(TelemetrySample::new(values));
        }

        info!("Loaded {} telemetry samples from {:?}.", samples.len(), filepath);

        Ok(Self::finalize(samples))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs::{read_to_string, write};
    use tempfile::tempdir;

    use crate::telemetry::ingester::ingest_line;

    fn create_table() -> TelemetryTable {
        let samples = [
            "10000,1000,1100,12.6,1.5,0.7,0.8,0.12,0.001",
            "20000,2000,2100,12.5,2.5,1.2,1.3,0.48,0.004",
            "30000,3000,3100,12.4,3.5,1.7,1.8,1.08,0.009",
            "40000,4000,4100,12.3,4.5,2.2,2.3,1.92,0.016",
        ]
        .iter()
        .map(|line| ingest_line(line).unwrap())
        .collect();

        TelemetryTable::finalize(samples)
    }

    #[test]
    fn test_finalize() {
        let table = create_table();

        assert_eq!(table.len(), 4);
        assert!(!table.is_empty());
        assert!(TelemetryTable::finalize(Vec::new()).is_empty());
    }

    #[test]
    fn test_column() {
        let table = create_table();

        assert_eq!(table.times(), vec![10.0, 20.0, 30.0, 40.0]);
        assert_eq!(
            table.column(ChannelKey::TopMotorRpm),
            vec![1000.0, 2000.0, 3000.0, 4000.0]
        );
    }

    #[test]
    fn test_window() {
        let table = create_table();

        assert_eq!(
            table.window(ChannelKey::TopMotorRpm, Some(10.0), Some(30.0)),
            vec![2000.0, 3000.0]
        );
        assert_eq!(
            table.window(ChannelKey::TopMotorRpm, None, Some(20.0)),
            vec![1000.0, 2000.0]
        );
        assert_eq!(
            table.window(ChannelKey::TopMotorRpm, Some(35.0), None),
            vec![4000.0]
        );
        assert_eq!(table.window(ChannelKey::Thrust, None, None).len(), 4);

        // Nothing after the last sample.
        assert!(table
            .window(ChannelKey::TopMotorRpm, Some(40.0), None)
            .is_empty());
    }

    #[test]
    fn test_save() {
        let dir = tempdir().unwrap();
        let filepath = dir.path().join("telemetry.csv");

        create_table().save(&filepath).unwrap();

        let content = read_to_string(&filepath).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(
            lines[0],
            "Time (ms),Top Motor Speed (rpm),Bottom Motor Speed (rpm),Battery Voltage (V),\
             Battery Current (A),Top Motor Current (A),Bottom Motor Current (A),Thrust (N),\
             Torque (N)"
        );
        assert_eq!(lines[1], "10,1000,1100,12.6,1.5,0.7,0.8,0.12,0.001");
    }

    #[test]
    fn test_save_or_warn() {
        let dir = tempdir().unwrap();

        assert!(create_table().save_or_warn(&dir.path().join("telemetry.csv")));
        assert!(!create_table().save_or_warn(&dir.path().join("missing/telemetry.csv")));
    }

    #[test]
    fn test_load_round_trip() {
        let dir = tempdir().unwrap();
        let filepath = dir.path().join("telemetry.csv");

        let table = create_table();
        table.save(&filepath).unwrap();

        assert_eq!(TelemetryTable::load(&filepath).unwrap(), table);
    }

    #[test]
    fn test_load_column_order() {
        let dir = tempdir().unwrap();
        let filepath = dir.path().join("telemetry.csv");

        write(
            &filepath,
            "Torque (N),Thrust (N),Bottom Motor Current (A),Top Motor Current (A),\
             Battery Current (A),Battery Voltage (V),Bottom Motor Speed (rpm),\
             Top Motor Speed (rpm),Time (ms)\n\
             0.001,0.12,0.8,0.7,1.5,12.6,1100,1000,10\n",
        )
        .unwrap();

        let table = TelemetryTable::load(&filepath).unwrap();

        assert_eq!(table, TelemetryTable::finalize(vec![create_table().samples()[0]]));
    }

    #[test]
    fn test_load_unknown_channel() {
        let dir = tempdir().unwrap();
        let filepath = dir.path().join("telemetry.csv");

        write(&filepath, "time_ms,top_motor_rpm\n1,2\n").unwrap();

        assert!(matches!(
            TelemetryTable::load(&filepath),
            Err(JigError::UnknownChannel(label)) if label == "time_ms"
        ));
    }

    #[test]
    fn test_load_missing_channel() {
        let dir = tempdir().unwrap();
        let filepath = dir.path().join("telemetry.csv");

        write(&filepath, "Time (ms),Thrust (N)\n1,2\n").unwrap();

        assert!(matches!(
            TelemetryTable::load(&filepath),
            Err(JigError::UnknownChannel(_))
        ));
    }

    #[test]
    fn test_load_not_numeric() {
        let dir = tempdir().unwrap();
        let filepath = dir.path().join("telemetry.csv");

        let mut table = String::from(
            "Time (ms),Top Motor Speed (rpm),Bottom Motor Speed (rpm),Battery Voltage (V),\
             Battery Current (A),Top Motor Current (A),Bottom Motor Current (A),Thrust (N),\
             Torque (N)\n",
        );
        table.push_str("10,1000,x,12.6,1.5,0.7,0.8,0.12,0.001\n");
        write(&filepath, table).unwrap();

        assert!(matches!(
            TelemetryTable::load(&filepath),
            Err(JigError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_not_finite() {
        let dir = tempdir().unwrap();
        let filepath = dir.path().join("telemetry.csv");

        let mut table = String::from(
            "Time (ms),Top Motor Speed (rpm),Bottom Motor Speed (rpm),Battery Voltage (V),\
             Battery Current (A),Top Motor Current (A),Bottom Motor Current (A),Thrust (N),\
             Torque (N)\n",
        );
        table.push_str("10,1000,1100,12.6,1.5,0.7,0.8,NaN,0.001\n");
        write(&filepath, table).unwrap();

        assert!(matches!(
            TelemetryTable::load(&filepath),
            Err(JigError::Parse { ref reason, .. }) if reason == "thrust_N is not finite: \"NaN\""
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            TelemetryTable::load(Path::new("missing.csv")),
            Err(JigError::Persistence(_))
        ));
    }
}
