//! Handler for the monitoring dashboard summary.

use axum::extract::State;
use axum::Json;
use gridwatch_core::thresholds::ThresholdTable;
use gridwatch_db::models::alert::AlertFilter;
use gridwatch_db::models::reading::{ReadingFilter, SensorReading};
use gridwatch_db::repositories::{AlertRepo, ReadingRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Everything the dashboard renders in one request.
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    /// Readings stored since the database was created.
    pub total_messages: i64,
    pub total_alerts: i64,
    pub active_alerts: i64,
    /// Newest reading per topic, sorted by topic.
    pub latest_readings: Vec<SensorReading>,
    pub topics: Vec<String>,
    /// Bands the ingestion loop is evaluating against.
    pub thresholds: ThresholdTable,
}

/// GET /api/v1/dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<DashboardSummary>>> {
    let total_messages = ReadingRepo::count(&state.pool, &ReadingFilter::default()).await?;
    let total_alerts = AlertRepo::count(&state.pool, &AlertFilter::default()).await?;
    let active_filter = AlertFilter {
        resolved: Some(false),
        ..Default::default()
    };
    let active_alerts = AlertRepo::count(&state.pool, &active_filter).await?;
    let latest_readings = ReadingRepo::latest_per_topic(&state.pool).await?;
    let topics = latest_readings.iter().map(|r| r.topic.clone()).collect();

    Ok(Json(DataResponse {
        data: DashboardSummary {
            total_messages,
            total_alerts,
            active_alerts,
            latest_readings,
            topics,
            thresholds: state.thresholds.as_ref().clone(),
        },
    }))
}
