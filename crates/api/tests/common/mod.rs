#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use gridwatch_core::thresholds::ThresholdTable;
use gridwatch_db::models::alert::Alert;
use gridwatch_db::models::reading::SensorReading;
use gridwatch_db::repositories::{AlertRepo, ReadingRepo};
use gridwatch_ingest::mqtt::{
    BrokerConfig, DEFAULT_KEEP_ALIVE, DEFAULT_MAX_PACKET_SIZE, DEFAULT_MQTT_PORT,
};
use gridwatch_ingest::processor::{process_message, AlertOutcome, ProcessOutcome};
use gridwatch_ingest::reconnect::ReconnectConfig;
use gridwatch_ingest::service::ConnectionState;
use gridwatch_ingest::store::PgRecordStore;
use gridwatch_ingest::transport::InboundMessage;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tokio::sync::watch;
use tower::ServiceExt;

use gridwatch_api::config::ServerConfig;
use gridwatch_api::router::build_app_router;
use gridwatch_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        db_max_connections: 5,
        broker: BrokerConfig {
            host: "localhost".to_string(),
            port: DEFAULT_MQTT_PORT,
            client_id: "gridwatch-test".to_string(),
            keep_alive: DEFAULT_KEEP_ALIVE,
            max_packet_size: DEFAULT_MAX_PACKET_SIZE,
        },
        topics: vec!["sensor/voltage".to_string()],
        reconnect: ReconnectConfig::default(),
        thresholds: ThresholdTable::defaults(),
    }
}

/// Build the full application router against `pool`, reporting
/// `ingestion` as the loop state.
pub fn build_test_app_with_state(pool: PgPool, ingestion: ConnectionState) -> Router {
    let config = test_config();
    // The sender may drop: the receiver keeps the last value.
    let (_tx, rx) = watch::channel(ingestion);

    let state = AppState {
        pool,
        thresholds: Arc::new(config.thresholds.clone()),
        config: Arc::new(config.clone()),
        ingestion: rx,
    };

    build_app_router(state, &config)
}

/// Build the full application router with the ingestion loop reported as
/// connected.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_state(pool, ConnectionState::Connected)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, method: Method, uri: &str) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri).await
}

pub async fn patch(app: Router, uri: &str) -> Response {
    send(app, Method::PATCH, uri).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

/// Push one message through the real ingestion processor and Postgres
/// store, returning the stored reading and alert (if any).
pub async fn ingest(pool: &PgPool, topic: &str, body: &str) -> (SensorReading, Option<Alert>) {
    let store = PgRecordStore::new(pool.clone());
    let message = InboundMessage::new(topic, body.as_bytes().to_vec());

    let outcome = process_message(&store, &ThresholdTable::defaults(), &message).await;
    let (reading_id, alert) = match outcome {
        ProcessOutcome::Stored { reading_id, alert } => (reading_id, alert),
        other => panic!("message was not stored: {other:?}"),
    };

    let reading = ReadingRepo::find_by_id(pool, reading_id).await.unwrap().unwrap();
    let alert = match alert {
        AlertOutcome::Raised { alert_id, .. } => {
            Some(AlertRepo::find_by_id(pool, alert_id).await.unwrap().unwrap())
        }
        AlertOutcome::NotRaised => None,
        AlertOutcome::Failed(e) => panic!("alert insert failed: {e}"),
    };
    (reading, alert)
}
