//! Alert synthesis for threshold breaches.
//!
//! Turns the ordered violations of one reading into an [`AlertDraft`]:
//! severity classification plus the operator-facing message. Persistence is
//! the caller's concern.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::parameters::Parameter;
use crate::thresholds::{ThresholdLimit, Violation};

/// Number of distinct violated parameters at which an alert becomes critical.
pub const CRITICAL_VIOLATION_COUNT: usize = 3;

/// Severity level for a threshold breach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// One or two parameters out of band.
    Warning,
    /// Three or more parameters out of band.
    Critical,
}

impl Severity {
    /// Classify by violation count alone; breach magnitude is not considered.
    pub fn from_violation_count(count: usize) -> Self {
        if count >= CRITICAL_VIOLATION_COUNT {
            Severity::Critical
        } else {
            Severity::Warning
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an operator has acknowledged an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionState {
    Active,
    Resolved,
}

impl ResolutionState {
    pub fn is_resolved(self) -> bool {
        self == ResolutionState::Resolved
    }
}

/// An alert ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertDraft {
    pub topic: String,
    /// Violated parameters in evaluation order. Never empty.
    pub violated_keys: Vec<Parameter>,
    pub actual_values: BTreeMap<Parameter, f64>,
    pub threshold_limits: BTreeMap<Parameter, ThresholdLimit>,
    pub message: String,
    pub severity: Severity,
    pub resolution: ResolutionState,
}

/// Build an alert from the violations of a single reading.
///
/// Returns `None` when there are no violations: an alert never exists
/// without at least one violated parameter.
pub fn synthesize(topic: &str, violations: &[Violation]) -> Option<AlertDraft> {
    if violations.is_empty() {
        return None;
    }

    let violated_keys: Vec<Parameter> = violations.iter().map(|v| v.parameter).collect();
    let actual_values = violations.iter().map(|v| (v.parameter, v.actual)).collect();
    let threshold_limits = violations.iter().map(|v| (v.parameter, v.limit)).collect();

    // Keys are unique per table, so the violation count is the number of
    // distinct violated parameters.
    let severity = Severity::from_violation_count(violated_keys.len());

    Some(AlertDraft {
        topic: topic.to_string(),
        violated_keys,
        actual_values,
        threshold_limits,
        message: compose_message(topic, violations),
        severity,
        resolution: ResolutionState::Active,
    })
}

/// `"Threshold breach on <topic>: temperature=95.2 (limit 0–80), ..."`
pub fn compose_message(topic: &str, violations: &[Violation]) -> String {
    let parts: Vec<String> = violations
        .iter()
        .map(|v| {
            format!(
                "{}={} (limit {}–{})",
                v.parameter, v.actual, v.limit.min, v.limit.max
            )
        })
        .collect();
    format!("Threshold breach on {topic}: {}", parts.join(", "))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
