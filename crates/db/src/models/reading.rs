//! Sensor reading entity model and DTOs.

use gridwatch_core::parameters::SensorValues;
use gridwatch_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `sensor_readings` table (append-only).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SensorReading {
    pub id: DbId,
    pub topic: String,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub voltage: Option<f64>,
    pub current: Option<f64>,
    pub pressure: Option<f64>,
    pub raw_payload: String,
    pub received_at: Timestamp,
}

impl SensorReading {
    /// The parameter columns as a [`SensorValues`].
    pub fn values(&self) -> SensorValues {
        SensorValues {
            temperature: self.temperature,
            humidity: self.humidity,
            voltage: self.voltage,
            current: self.current,
            pressure: self.pressure,
        }
    }
}

/// DTO for inserting a reading. `id` and `received_at` are assigned by the
/// database.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateSensorReading {
    pub topic: String,
    pub values: SensorValues,
    pub raw_payload: String,
}

/// Optional filters for reading listings. Time bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct ReadingFilter {
    pub topic: Option<String>,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
}
