//! Repository for the `sensor_readings` table (append-only).

use gridwatch_core::types::DbId;
use sqlx::PgPool;

use crate::models::reading::{CreateSensorReading, ReadingFilter, SensorReading};

/// Column list for `sensor_readings` SELECT queries.
const COLUMNS: &str = "\
    id, topic, temperature, humidity, voltage, current, pressure, \
    raw_payload, received_at";

/// WHERE clause shared by `list` and `count`. Each filter is skipped when its
/// parameter is NULL.
const FILTER: &str = "\
    WHERE ($1::text IS NULL OR topic = $1) \
      AND ($2::timestamptz IS NULL OR received_at >= $2) \
      AND ($3::timestamptz IS NULL OR received_at <= $3)";

/// Provides query operations for sensor readings.
pub struct ReadingRepo;

impl ReadingRepo {
    /// Insert a reading. `id` and `received_at` are assigned by the database.
    pub async fn insert(
        pool: &PgPool,
        reading: &CreateSensorReading,
    ) -> Result<SensorReading, sqlx::Error> {
        let query = format!(
            "INSERT INTO sensor_readings \
                (topic, temperature, humidity, voltage, current, pressure, raw_payload) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SensorReading>(&query)
            .bind(&reading.topic)
            .bind(reading.values.temperature)
            .bind(reading.values.humidity)
            .bind(reading.values.voltage)
            .bind(reading.values.current)
            .bind(reading.values.pressure)
            .bind(&reading.raw_payload)
            .fetch_one(pool)
            .await
    }

    /// Find a reading by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SensorReading>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sensor_readings WHERE id = $1");
        sqlx::query_as::<_, SensorReading>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List readings matching `filter`, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &ReadingFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SensorReading>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sensor_readings {FILTER} \
             ORDER BY received_at DESC, id DESC \
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, SensorReading>(&query)
            .bind(filter.topic.as_deref())
            .bind(filter.start_time)
            .bind(filter.end_time)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count readings matching `filter`.
    pub async fn count(pool: &PgPool, filter: &ReadingFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM sensor_readings {FILTER}");
        sqlx::query_scalar(&query)
            .bind(filter.topic.as_deref())
            .bind(filter.start_time)
            .bind(filter.end_time)
            .fetch_one(pool)
            .await
    }

    /// The most recent readings across all topics.
    pub async fn latest(pool: &PgPool, limit: i64) -> Result<Vec<SensorReading>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sensor_readings \
             ORDER BY received_at DESC, id DESC \
             LIMIT $1"
        );
        sqlx::query_as::<_, SensorReading>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Distinct topics that have produced at least one reading.
    pub async fn distinct_topics(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT DISTINCT topic FROM sensor_readings ORDER BY topic")
            .fetch_all(pool)
            .await
    }

    /// The latest reading per topic.
    ///
    /// Uses `DISTINCT ON` to select the most recent row for each topic.
    pub async fn latest_per_topic(pool: &PgPool) -> Result<Vec<SensorReading>, sqlx::Error> {
        let query = format!(
            "SELECT DISTINCT ON (topic) {COLUMNS} FROM sensor_readings \
             ORDER BY topic, received_at DESC, id DESC"
        );
        sqlx::query_as::<_, SensorReading>(&query)
            .fetch_all(pool)
            .await
    }
}
