use std::sync::Arc;

use gridwatch_core::thresholds::ThresholdTable;
use gridwatch_ingest::service::ConnectionState;
use tokio::sync::watch;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: gridwatch_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The threshold table the ingestion loop evaluates against.
    pub thresholds: Arc<ThresholdTable>,
    /// Live view of the ingestion connection state.
    pub ingestion: watch::Receiver<ConnectionState>,
}
