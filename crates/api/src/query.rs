//! Query parameter types for the listing endpoints.
//!
//! Range checks happen in the handlers via `gridwatch_core::pagination`;
//! these structs only describe the wire shape. Timestamps are RFC 3339.
//!
//! Pagination fields are repeated rather than `#[serde(flatten)]`ed:
//! flattening breaks numeric parsing of urlencoded queries.

use gridwatch_core::alert::Severity;
use gridwatch_core::types::Timestamp;
use serde::Deserialize;

/// `?limit=` for the "newest N" endpoints.
#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

/// Filters for `GET /sensor-data`.
#[derive(Debug, Deserialize)]
pub struct ReadingListParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub topic: Option<String>,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
}

/// Filters for `GET /alerts`.
#[derive(Debug, Deserialize)]
pub struct AlertListParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub topic: Option<String>,
    pub severity: Option<Severity>,
    pub resolved: Option<bool>,
}
