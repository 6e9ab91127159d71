pub mod alerts;
pub mod dashboard;
pub mod health;
pub mod readings;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /sensor-data                   paginated readings (GET)
/// /sensor-data/latest            newest readings (GET)
/// /sensor-data/topics            distinct topics (GET)
///
/// /alerts                        paginated alerts (GET)
/// /alerts/active                 unresolved alerts (GET)
/// /alerts/{id}/resolve           resolve an alert (PATCH)
///
/// /dashboard                     summary counters and latest values (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/sensor-data", readings::router())
        .nest("/alerts", alerts::router())
        .nest("/dashboard", dashboard::router())
}
