//! Handlers for threshold alerts.
//!
//! Alerts are created only by the ingestion loop. The API can list them and
//! perform the single allowed transition, active -> resolved.

use axum::extract::{Path, Query, State};
use axum::Json;
use gridwatch_core::error::CoreError;
use gridwatch_core::pagination::{bounded_limit, PageRequest};
use gridwatch_core::types::DbId;
use gridwatch_db::models::alert::{Alert, AlertFilter};
use gridwatch_db::repositories::AlertRepo;

use crate::error::AppResult;
use crate::query::{AlertListParams, LimitParams};
use crate::response::{DataResponse, Page};
use crate::state::AppState;

const ACTIVE_DEFAULT_LIMIT: i64 = 20;
const ACTIVE_MAX_LIMIT: i64 = 100;

/// GET /api/v1/alerts
///
/// Paginated alerts, newest first. Optional `topic`, `severity` and
/// `resolved` filters.
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(params): Query<AlertListParams>,
) -> AppResult<Json<DataResponse<Page<Alert>>>> {
    let request = PageRequest::new(params.page, params.page_size)?;
    let filter = AlertFilter {
        topic: params.topic,
        severity: params.severity,
        resolved: params.resolved,
    };

    let total = AlertRepo::count(&state.pool, &filter).await?;
    let items = AlertRepo::list(&state.pool, &filter, request.limit(), request.offset()).await?;

    Ok(Json(DataResponse {
        data: Page::new(items, total, request),
    }))
}

/// GET /api/v1/alerts/active
pub async fn active_alerts(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> AppResult<Json<DataResponse<Vec<Alert>>>> {
    let limit = bounded_limit(params.limit, ACTIVE_DEFAULT_LIMIT, ACTIVE_MAX_LIMIT)?;
    let alerts = AlertRepo::list_active(&state.pool, limit).await?;
    Ok(Json(DataResponse { data: alerts }))
}

/// PATCH /api/v1/alerts/{id}/resolve
///
/// 404 for an unknown id, 409 if the alert is already resolved.
pub async fn resolve_alert(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Alert>>> {
    if let Some(alert) = AlertRepo::resolve(&state.pool, id).await? {
        tracing::info!(alert_id = id, topic = %alert.topic, "Alert resolved");
        return Ok(Json(DataResponse { data: alert }));
    }

    // The conditional update matched nothing: tell unknown apart from done.
    match AlertRepo::find_by_id(&state.pool, id).await? {
        Some(_) => Err(CoreError::Conflict(format!("Alert {id} is already resolved")).into()),
        None => Err(CoreError::NotFound { entity: "Alert", id }.into()),
    }
}
