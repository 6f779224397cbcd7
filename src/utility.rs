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

use approx::assert_relative_eq;
use config::Config;
use std::path::{Path, PathBuf};
use time::{macros::format_description, OffsetDateTime};

pub trait ConfigValue: Sized {
    /// Parse the configuration value.
    ///
    /// # Parameters
    /// * `s` - String to parse.
    ///
    /// # Returns
    /// The parsed configuration value.
    fn parse_value(s: &str) -> Self;
}

impl ConfigValue for String {
    fn parse_value(s: &str) -> Self {
        s.to_string()
    }
}

impl ConfigValue for f64 {
    fn parse_value(s: &str) -> Self {
        s.parse::<f64>().expect(&format!("{s} should parse as f64"))
    }
}

impl ConfigValue for u32 {
    fn parse_value(s: &str) -> Self {
        s.parse::<u32>().expect(&format!("{s} should parse as u32"))
    }
}

impl ConfigValue for u64 {
    fn parse_value(s: &str) -> Self {
        s.parse::<u64>().expect(&format!("{s} should parse as u64"))
    }
}

impl ConfigValue for bool {
    fn parse_value(s: &str) -> Self {
        s.parse::<bool>()
            .expect(&format!("{s} should parse as bool"))
    }
}

/// Get the configuration.
///
/// # Arguments
/// * `filepath` - Path to the configuration file.
///
/// # Returns
/// Configuration.
///
/// # Panics
/// If the file can not be read.
pub fn get_config(filepath: &Path) -> Config {
    let name = filepath
        .to_str()
        .expect(&format!("Should have the file name in the {:?}", filepath));

    Config::builder()
        .add_source(config::File::with_name(name))
        .build()
        .expect(&format!("Should be able to read the {name}"))
}

/// Get the parameter from the configuration file.
///
/// # Arguments
/// * `filepath` - Path to the configuration file.
/// * `key` - Key of the parameter.
///
/// # Returns
/// Parameter value.
///
/// # Panics
/// If the key is not found or the value can not be parsed.
pub fn get_parameter<T: ConfigValue>(filepath: &Path, key: &str) -> T {
    let config = get_config(filepath);

    config
        .get_string(key)
        .map(|v| T::parse_value(&v))
        .expect(&format!("Should find the {key} in the {:?}", filepath))
}

/// Get the path of a new telemetry file named by the current UTC time.
///
/// # Arguments
/// * `directory` - Directory of the file.
///
/// # Returns
/// Path like directory/2024-01-31_13-45-00-123.csv. The last field is in
/// millisecond so the runs started in the same second do not share a file.
pub fn get_timestamped_filepath(directory: &Path) -> PathBuf {
    let format =
        format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]-[subsecond digits:3]");
    let name = OffsetDateTime::now_utc()
        .format(format)
        .unwrap_or_else(|_| String::from("telemetry"));

    directory.join(format!("{name}.csv"))
}

pub fn assert_relative_eq_vector(v1: &[f64], v2: &[f64], epsilon: f64) {
    assert_eq!(v1.len(), v2.len());
    for (a, b) in v1.iter().zip(v2.iter()) {
        assert_relative_eq!(a, b, epsilon = epsilon);
    }
}
