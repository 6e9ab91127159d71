//! Alert entity model and DTOs.

use gridwatch_core::alert::{AlertDraft, Severity};
use gridwatch_core::types::{DbId, Timestamp};
use serde::Serialize;
use serde_json::{json, Map, Value};
use sqlx::FromRow;

/// A row from the `alerts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Alert {
    pub id: DbId,
    /// Reading the alert was raised for.
    pub reading_id: Option<DbId>,
    pub topic: String,
    /// JSON array of parameter names in evaluation order.
    pub violated_keys: Value,
    /// JSON object `parameter -> actual value`.
    pub actual_values: Value,
    /// JSON object `parameter -> {"min", "max"}`.
    pub threshold_limits: Value,
    pub message: String,
    /// `warning` or `critical`.
    pub severity: String,
    pub resolved: bool,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for inserting an alert. `id` and `created_at` are assigned by the
/// database.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateAlert {
    pub reading_id: Option<DbId>,
    pub topic: String,
    pub violated_keys: Value,
    pub actual_values: Value,
    pub threshold_limits: Value,
    pub message: String,
    pub severity: Severity,
    pub resolved: bool,
}

impl CreateAlert {
    /// Convert a synthesized draft into its storage shape.
    pub fn from_draft(reading_id: Option<DbId>, draft: &AlertDraft) -> Self {
        let violated_keys = Value::Array(
            draft
                .violated_keys
                .iter()
                .map(|p| Value::from(p.as_str()))
                .collect(),
        );

        let actual_values: Map<String, Value> = draft
            .actual_values
            .iter()
            .map(|(p, v)| (p.as_str().to_string(), Value::from(*v)))
            .collect();

        let threshold_limits: Map<String, Value> = draft
            .threshold_limits
            .iter()
            .map(|(p, l)| (p.as_str().to_string(), json!({ "min": l.min, "max": l.max })))
            .collect();

        Self {
            reading_id,
            topic: draft.topic.clone(),
            violated_keys,
            actual_values: Value::Object(actual_values),
            threshold_limits: Value::Object(threshold_limits),
            message: draft.message.clone(),
            severity: draft.severity,
            resolved: draft.resolution.is_resolved(),
        }
    }
}

/// Optional filters for alert listings.
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub topic: Option<String>,
    pub severity: Option<Severity>,
    pub resolved: Option<bool>,
}
