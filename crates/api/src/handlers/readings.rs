//! Handlers for sensor reading queries.

use axum::extract::{Query, State};
use axum::Json;
use gridwatch_core::error::CoreError;
use gridwatch_core::pagination::{bounded_limit, PageRequest};
use gridwatch_db::models::reading::{ReadingFilter, SensorReading};
use gridwatch_db::repositories::ReadingRepo;

use crate::error::AppResult;
use crate::query::{LimitParams, ReadingListParams};
use crate::response::{DataResponse, Page};
use crate::state::AppState;

/// Default and maximum `limit` for `/sensor-data/latest`.
const LATEST_DEFAULT_LIMIT: i64 = 10;
const LATEST_MAX_LIMIT: i64 = 50;

/// GET /api/v1/sensor-data
///
/// Paginated readings, newest first. Optional `topic` and inclusive
/// `start_time` / `end_time` filters.
pub async fn list_readings(
    State(state): State<AppState>,
    Query(params): Query<ReadingListParams>,
) -> AppResult<Json<DataResponse<Page<SensorReading>>>> {
    let request = PageRequest::new(params.page, params.page_size)?;

    if let (Some(start), Some(end)) = (params.start_time, params.end_time) {
        if start > end {
            return Err(CoreError::Validation(
                "start_time must not be after end_time".to_string(),
            )
            .into());
        }
    }

    let filter = ReadingFilter {
        topic: params.topic,
        start_time: params.start_time,
        end_time: params.end_time,
    };

    let total = ReadingRepo::count(&state.pool, &filter).await?;
    let items = ReadingRepo::list(&state.pool, &filter, request.limit(), request.offset()).await?;

    Ok(Json(DataResponse {
        data: Page::new(items, total, request),
    }))
}

/// GET /api/v1/sensor-data/latest
pub async fn latest_readings(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> AppResult<Json<DataResponse<Vec<SensorReading>>>> {
    let limit = bounded_limit(params.limit, LATEST_DEFAULT_LIMIT, LATEST_MAX_LIMIT)?;
    let readings = ReadingRepo::latest(&state.pool, limit).await?;
    Ok(Json(DataResponse { data: readings }))
}

/// GET /api/v1/sensor-data/topics
///
/// Topics that have delivered at least one stored reading, sorted.
pub async fn list_topics(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<String>>>> {
    let topics = ReadingRepo::distinct_topics(&state.pool).await?;
    Ok(Json(DataResponse { data: topics }))
}
