//! Repository for the `alerts` table.

use gridwatch_core::types::DbId;
use sqlx::PgPool;

use crate::models::alert::{Alert, AlertFilter, CreateAlert};

/// Column list for `alerts` queries.
const COLUMNS: &str = "\
    id, reading_id, topic, violated_keys, actual_values, threshold_limits, \
    message, severity, resolved, resolved_at, created_at";

/// WHERE clause shared by `list` and `count`. Each filter is skipped when its
/// parameter is NULL.
const FILTER: &str = "\
    WHERE ($1::text IS NULL OR topic = $1) \
      AND ($2::text IS NULL OR severity = $2) \
      AND ($3::boolean IS NULL OR resolved = $3)";

/// Provides query operations for alerts.
pub struct AlertRepo;

impl AlertRepo {
    /// Insert an alert. `id` and `created_at` are assigned by the database.
    pub async fn insert(pool: &PgPool, alert: &CreateAlert) -> Result<Alert, sqlx::Error> {
        let query = format!(
            "INSERT INTO alerts \
                (reading_id, topic, violated_keys, actual_values, threshold_limits, \
                 message, severity, resolved) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(alert.reading_id)
            .bind(&alert.topic)
            .bind(&alert.violated_keys)
            .bind(&alert.actual_values)
            .bind(&alert.threshold_limits)
            .bind(&alert.message)
            .bind(alert.severity.as_str())
            .bind(alert.resolved)
            .fetch_one(pool)
            .await
    }

    /// Find an alert by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM alerts WHERE id = $1");
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List alerts matching `filter`, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &AlertFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Alert>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alerts {FILTER} \
             ORDER BY created_at DESC, id DESC \
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(filter.topic.as_deref())
            .bind(filter.severity.map(|s| s.as_str()))
            .bind(filter.resolved)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count alerts matching `filter`.
    pub async fn count(pool: &PgPool, filter: &AlertFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM alerts {FILTER}");
        sqlx::query_scalar(&query)
            .bind(filter.topic.as_deref())
            .bind(filter.severity.map(|s| s.as_str()))
            .bind(filter.resolved)
            .fetch_one(pool)
            .await
    }

    /// Unresolved alerts, newest first.
    pub async fn list_active(pool: &PgPool, limit: i64) -> Result<Vec<Alert>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alerts WHERE resolved = false \
             ORDER BY created_at DESC, id DESC \
             LIMIT $1"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Transition an active alert to resolved.
    ///
    /// Returns the updated row, or `None` if no *active* alert has this id
    /// (either it does not exist or it was already resolved).
    pub async fn resolve(pool: &PgPool, id: DbId) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!(
            "UPDATE alerts SET resolved = true, resolved_at = NOW() \
             WHERE id = $1 AND resolved = false \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
