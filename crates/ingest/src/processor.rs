//! Per-message processing: decode, persist, evaluate, alert.
//!
//! [`process_message`] is the unit of work the ingestion loop runs for
//! every inbound message. It never returns an error: every failure is
//! logged and reported through [`ProcessOutcome`] so the loop can keep
//! receiving. The function holds no state of its own and is safe to run
//! concurrently for any number of messages.

use gridwatch_core::alert::{synthesize, Severity};
use gridwatch_core::payload::{decode, DecodeError};
use gridwatch_core::thresholds::{evaluate, ThresholdTable};
use gridwatch_core::types::DbId;
use gridwatch_db::models::alert::CreateAlert;
use gridwatch_db::models::reading::CreateSensorReading;

use crate::store::{RecordStore, StoreError};
use crate::transport::InboundMessage;

/// What happened to one inbound message.
#[derive(Debug)]
pub enum ProcessOutcome {
    /// The body could not be decoded. Nothing was stored.
    Dropped(DecodeError),
    /// The reading insert failed. Evaluation was skipped.
    ReadingFailed(StoreError),
    /// The reading is durable; `alert` describes the alert step.
    Stored { reading_id: DbId, alert: AlertOutcome },
}

/// Result of the alert step for a stored reading.
#[derive(Debug)]
pub enum AlertOutcome {
    /// Every reported parameter was inside its band.
    NotRaised,
    Raised { alert_id: DbId, severity: Severity },
    /// The alert insert failed. The reading stays stored.
    Failed(StoreError),
}

/// Handle one inbound message end to end.
///
/// Order is fixed: the reading is made durable before thresholds are
/// evaluated, so an alert always references a stored reading and a storage
/// failure never produces an orphan alert.
pub async fn process_message(
    store: &dyn RecordStore,
    thresholds: &ThresholdTable,
    message: &InboundMessage,
) -> ProcessOutcome {
    let decoded = match decode(&message.payload) {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::warn!(
                topic = %message.topic,
                bytes = message.payload.len(),
                error = %e,
                "Dropping undecodable message",
            );
            return ProcessOutcome::Dropped(e);
        }
    };

    let reading = CreateSensorReading {
        topic: message.topic.clone(),
        values: decoded.values,
        raw_payload: decoded.raw,
    };

    let reading_id = match store.insert_reading(&reading).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(topic = %message.topic, error = %e, "Failed to store reading");
            return ProcessOutcome::ReadingFailed(e);
        }
    };

    tracing::debug!(
        topic = %message.topic,
        reading_id,
        reported = decoded.values.reported_count(),
        "Reading stored",
    );

    let violations = evaluate(&decoded.values, thresholds);
    let Some(draft) = synthesize(&message.topic, &violations) else {
        return ProcessOutcome::Stored {
            reading_id,
            alert: AlertOutcome::NotRaised,
        };
    };

    let alert = CreateAlert::from_draft(Some(reading_id), &draft);
    let outcome = match store.insert_alert(&alert).await {
        Ok(alert_id) => {
            tracing::warn!(
                topic = %message.topic,
                reading_id,
                alert_id,
                severity = %draft.severity,
                summary = %draft.message,
                "Threshold alert raised",
            );
            AlertOutcome::Raised {
                alert_id,
                severity: draft.severity,
            }
        }
        Err(e) => {
            tracing::error!(
                topic = %message.topic,
                reading_id,
                error = %e,
                "Failed to store alert",
            );
            AlertOutcome::Failed(e)
        }
    };

    ProcessOutcome::Stored {
        reading_id,
        alert: outcome,
    }
}
