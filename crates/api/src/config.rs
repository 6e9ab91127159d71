use std::time::Duration;

use gridwatch_core::error::CoreError;
use gridwatch_core::parameters::Parameter;
use gridwatch_core::thresholds::{default_limit, ThresholdLimit, ThresholdTable};
use gridwatch_db::DEFAULT_MAX_CONNECTIONS;
use gridwatch_ingest::mqtt::{
    BrokerConfig, DEFAULT_KEEP_ALIVE, DEFAULT_MAX_PACKET_SIZE, DEFAULT_MQTT_PORT,
};
use gridwatch_ingest::reconnect::{ReconnectConfig, DEFAULT_RECONNECT_DELAY};

/// Topics subscribed when `MQTT_TOPICS` is unset.
pub const DEFAULT_TOPICS: &str = "sensor/temperature,sensor/humidity,sensor/voltage,\
sensor/current,sensor/pressure,sensor/power,sensor/energy,sensor/frequency";

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on pooled database connections (default: `30`).
    pub db_max_connections: u32,
    /// MQTT broker connection settings.
    pub broker: BrokerConfig,
    /// Topics subscribed on every (re)connect.
    pub topics: Vec<String>,
    pub reconnect: ReconnectConfig,
    /// Threshold bands, fixed for the lifetime of the process.
    pub thresholds: ThresholdTable,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                        |
    /// |-------------------------------|--------------------------------|
    /// | `HOST`                        | `0.0.0.0`                      |
    /// | `PORT`                        | `3000`                         |
    /// | `CORS_ORIGINS`                | `http://localhost:3000`        |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                           |
    /// | `DB_MAX_CONNECTIONS`          | `30`                           |
    /// | `MQTT_BROKER_HOST`            | `mqtt-broker`                  |
    /// | `MQTT_BROKER_PORT`            | `1883`                         |
    /// | `MQTT_CLIENT_ID`              | `gridwatch-ingest-<random>`    |
    /// | `MQTT_TOPICS`                 | [`DEFAULT_TOPICS`]             |
    /// | `MQTT_KEEP_ALIVE_SECS`        | `60`                           |
    /// | `MQTT_MAX_PACKET_SIZE`        | `1048576` (bytes)              |
    /// | `MQTT_RECONNECT_DELAY_SECS`   | `5`                            |
    /// | `THRESHOLD_<PARAM>_MIN/_MAX`  | factory band for `<PARAM>`     |
    ///
    /// Panics on malformed values: misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = split_list(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let db_max_connections: u32 = std::env::var("DB_MAX_CONNECTIONS")
            .map(|v| v.parse().expect("DB_MAX_CONNECTIONS must be a valid u32"))
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        let broker = BrokerConfig {
            host: std::env::var("MQTT_BROKER_HOST").unwrap_or_else(|_| "mqtt-broker".into()),
            port: std::env::var("MQTT_BROKER_PORT")
                .map(|v| v.parse().expect("MQTT_BROKER_PORT must be a valid u16"))
                .unwrap_or(DEFAULT_MQTT_PORT),
            client_id: std::env::var("MQTT_CLIENT_ID")
                .ok()
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(generated_client_id),
            keep_alive: std::env::var("MQTT_KEEP_ALIVE_SECS")
                .map(|v| {
                    Duration::from_secs(v.parse().expect("MQTT_KEEP_ALIVE_SECS must be a valid u64"))
                })
                .unwrap_or(DEFAULT_KEEP_ALIVE),
            max_packet_size: std::env::var("MQTT_MAX_PACKET_SIZE")
                .map(|v| v.parse().expect("MQTT_MAX_PACKET_SIZE must be a valid usize"))
                .unwrap_or(DEFAULT_MAX_PACKET_SIZE),
        };

        let topics = split_list(&std::env::var("MQTT_TOPICS").unwrap_or_else(|_| DEFAULT_TOPICS.into()));
        assert!(!topics.is_empty(), "MQTT_TOPICS must name at least one topic");

        let reconnect = ReconnectConfig {
            delay: std::env::var("MQTT_RECONNECT_DELAY_SECS")
                .map(|v| {
                    Duration::from_secs(
                        v.parse()
                            .expect("MQTT_RECONNECT_DELAY_SECS must be a valid u64"),
                    )
                })
                .unwrap_or(DEFAULT_RECONNECT_DELAY),
        };

        let thresholds = thresholds_from(|key| std::env::var(key).ok())
            .unwrap_or_else(|e| panic!("Invalid threshold configuration: {e}"));

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            db_max_connections,
            broker,
            topics,
            reconnect,
            thresholds,
        }
    }
}

/// Split a comma-separated list, trimming entries and dropping blanks.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn generated_client_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("gridwatch-ingest-{}", &suffix[..8])
}

/// Build the threshold table from `THRESHOLD_<PARAM>_MIN` / `_MAX` overrides.
///
/// Every recognized parameter gets a band; an unset bound keeps its factory
/// value. `lookup` abstracts the environment so the parsing is testable.
pub fn thresholds_from(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ThresholdTable, CoreError> {
    let mut limits = Vec::with_capacity(Parameter::ALL.len());

    for param in Parameter::ALL {
        let name = param.as_str().to_uppercase();
        let factory = default_limit(param);
        let min = bound(&lookup, &format!("THRESHOLD_{name}_MIN"), factory.min)?;
        let max = bound(&lookup, &format!("THRESHOLD_{name}_MAX"), factory.max)?;
        limits.push((param, ThresholdLimit::new(min, max)?));
    }

    Ok(ThresholdTable::new(limits))
}

fn bound(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: f64,
) -> Result<f64, CoreError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| CoreError::Validation(format!("{key} must be a number, got '{raw}'"))),
    }
}
