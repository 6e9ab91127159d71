//! Route definitions for threshold alerts.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::alerts;
use crate::state::AppState;

/// Routes mounted at `/alerts`.
///
/// ```text
/// GET    /                 -> list_alerts
/// GET    /active           -> active_alerts
/// PATCH  /{id}/resolve     -> resolve_alert
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(alerts::list_alerts))
        .route("/active", get(alerts::active_alerts))
        .route("/{id}/resolve", patch(alerts::resolve_alert))
}
