//! Route definitions for sensor reading queries.

use axum::routing::get;
use axum::Router;

use crate::handlers::readings;
use crate::state::AppState;

/// Routes mounted at `/sensor-data`.
///
/// ```text
/// GET  /           -> list_readings
/// GET  /latest     -> latest_readings
/// GET  /topics     -> list_topics
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(readings::list_readings))
        .route("/latest", get(readings::latest_readings))
        .route("/topics", get(readings::list_topics))
}
