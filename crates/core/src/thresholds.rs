//! Threshold evaluation engine for sensor readings.
//!
//! Pure logic: no database access. The ingestion loop passes in the decoded
//! values and the process-wide threshold table, and gets back the ordered
//! list of out-of-band parameters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::parameters::{Parameter, SensorValues};

/// Inclusive `[min, max]` band of acceptable values for one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdLimit {
    pub min: f64,
    pub max: f64,
}

impl ThresholdLimit {
    /// Build a band, rejecting `min > max` and non-finite bounds.
    pub fn new(min: f64, max: f64) -> Result<Self, CoreError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(CoreError::Validation(format!(
                "threshold bounds must be finite, got {min}..{max}"
            )));
        }
        if min > max {
            return Err(CoreError::Validation(format!(
                "threshold min {min} is greater than max {max}"
            )));
        }
        Ok(Self { min, max })
    }

    /// Whether `value` lies inside the band. Bounds are compliant.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Immutable mapping from parameter to its band.
///
/// Iteration is always in canonical [`Parameter`] order, which makes
/// violation ordering deterministic. Serializes as
/// `{"temperature": {"min": 0.0, "max": 80.0}, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ThresholdTable {
    limits: BTreeMap<Parameter, ThresholdLimit>,
}

impl ThresholdTable {
    /// Build a table from explicit bands.
    pub fn new(limits: impl IntoIterator<Item = (Parameter, ThresholdLimit)>) -> Self {
        Self {
            limits: limits.into_iter().collect(),
        }
    }

    /// Factory bands for every recognized parameter.
    pub fn defaults() -> Self {
        Self::new(Parameter::ALL.into_iter().map(|p| (p, default_limit(p))))
    }

    /// Band configured for `param`, if the table covers it.
    pub fn get(&self, param: Parameter) -> Option<&ThresholdLimit> {
        self.limits.get(&param)
    }

    /// Bands in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Parameter, &ThresholdLimit)> {
        self.limits.iter().map(|(p, l)| (*p, l))
    }

    pub fn len(&self) -> usize {
        self.limits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }
}

/// Factory band for one parameter.
pub fn default_limit(param: Parameter) -> ThresholdLimit {
    let (min, max) = match param {
        Parameter::Temperature => (0.0, 80.0),
        Parameter::Humidity => (10.0, 95.0),
        Parameter::Voltage => (180.0, 260.0),
        Parameter::Current => (0.0, 30.0),
        Parameter::Pressure => (900.0, 1100.0),
    };
    ThresholdLimit { min, max }
}

/// One parameter whose reported value fell outside its band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Violation {
    pub parameter: Parameter,
    pub actual: f64,
    pub limit: ThresholdLimit,
}

/// Evaluate a reading against the threshold table.
///
/// Parameters absent from the reading are skipped. The result follows the
/// table's canonical order, never the payload's key order.
pub fn evaluate(values: &SensorValues, thresholds: &ThresholdTable) -> Vec<Violation> {
    thresholds
        .iter()
        .filter_map(|(parameter, limit)| {
            let actual = values.get(parameter)?;
            (!limit.contains(actual)).then_some(Violation {
                parameter,
                actual,
                limit: *limit,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
