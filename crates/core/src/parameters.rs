//! The closed set of sensor parameters the platform recognizes.
//!
//! These names are the JSON keys accepted in telemetry payloads, the column
//! names of the `sensor_readings` table, and the keys of the threshold table.
//! Declaration order is the canonical evaluation order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A recognized sensor parameter.
///
/// `Ord` follows declaration order, so a `BTreeMap<Parameter, _>` iterates in
/// canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parameter {
    Temperature,
    Humidity,
    Voltage,
    Current,
    Pressure,
}

impl Parameter {
    /// Every parameter, in canonical order.
    pub const ALL: [Parameter; 5] = [
        Parameter::Temperature,
        Parameter::Humidity,
        Parameter::Voltage,
        Parameter::Current,
        Parameter::Pressure,
    ];

    /// Wire and column name of the parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Parameter::Temperature => "temperature",
            Parameter::Humidity => "humidity",
            Parameter::Voltage => "voltage",
            Parameter::Current => "current",
            Parameter::Pressure => "pressure",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Parameter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parameter::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown sensor parameter '{s}'")))
    }
}

/// Optional values for every recognized parameter in one reading.
///
/// `None` means the parameter was not reported in the message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorValues {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub voltage: Option<f64>,
    pub current: Option<f64>,
    pub pressure: Option<f64>,
}

impl SensorValues {
    /// Value reported for `param`, if any.
    pub fn get(&self, param: Parameter) -> Option<f64> {
        match param {
            Parameter::Temperature => self.temperature,
            Parameter::Humidity => self.humidity,
            Parameter::Voltage => self.voltage,
            Parameter::Current => self.current,
            Parameter::Pressure => self.pressure,
        }
    }

    /// Set the value for `param`.
    pub fn set(&mut self, param: Parameter, value: Option<f64>) {
        let slot = match param {
            Parameter::Temperature => &mut self.temperature,
            Parameter::Humidity => &mut self.humidity,
            Parameter::Voltage => &mut self.voltage,
            Parameter::Current => &mut self.current,
            Parameter::Pressure => &mut self.pressure,
        };
        *slot = value;
    }

    /// Number of parameters present in this reading.
    pub fn reported_count(&self) -> usize {
        Parameter::ALL
            .into_iter()
            .filter(|p| self.get(*p).is_some())
            .count()
    }
}
