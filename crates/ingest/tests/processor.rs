//! End-to-end behaviour of `process_message` against an in-memory store.

mod common;

use assert_matches::assert_matches;
use gridwatch_core::alert::Severity;
use gridwatch_core::thresholds::ThresholdTable;
use gridwatch_ingest::processor::{process_message, AlertOutcome, ProcessOutcome};
use serde_json::json;

use common::{message, FakeStore};

#[tokio::test]
async fn two_breaches_store_reading_and_warning_alert() {
    let store = FakeStore::new();
    let msg = message(
        "sensor/voltage",
        r#"{"temperature": 95.2, "voltage": 270, "current": 5}"#,
    );

    let outcome = process_message(store.as_ref(), &ThresholdTable::defaults(), &msg).await;
    let (reading_id, alert_id) = assert_matches!(
        outcome,
        ProcessOutcome::Stored {
            reading_id,
            alert: AlertOutcome::Raised { alert_id, severity: Severity::Warning },
        } => (reading_id, alert_id)
    );
    assert_ne!(reading_id, alert_id);

    let readings = store.readings();
    assert_eq!(readings.len(), 1);
    let (_, reading) = &readings[0];
    assert_eq!(reading.topic, "sensor/voltage");
    assert_eq!(reading.values.temperature, Some(95.2));
    assert_eq!(reading.values.voltage, Some(270.0));
    assert_eq!(reading.values.current, Some(5.0));
    assert_eq!(reading.raw_payload, r#"{"temperature": 95.2, "voltage": 270, "current": 5}"#);

    let alerts = store.alerts();
    assert_eq!(alerts.len(), 1);
    let (_, alert) = &alerts[0];
    assert_eq!(alert.reading_id, Some(reading_id));
    assert_eq!(alert.topic, "sensor/voltage");
    assert_eq!(alert.violated_keys, json!(["temperature", "voltage"]));
    assert_eq!(alert.actual_values, json!({"temperature": 95.2, "voltage": 270.0}));
    assert_eq!(alert.threshold_limits["voltage"], json!({"min": 180.0, "max": 260.0}));
    assert_eq!(alert.severity, Severity::Warning);
    assert!(!alert.resolved);
    assert_eq!(
        alert.message,
        "Threshold breach on sensor/voltage: temperature=95.2 (limit 0–80), voltage=270 (limit 180–260)"
    );
}

#[tokio::test]
async fn three_breaches_raise_critical_alert() {
    let store = FakeStore::new();
    let msg = message(
        "sensor/temperature",
        r#"{"temperature": 95, "humidity": 5, "voltage": 300}"#,
    );

    let outcome = process_message(store.as_ref(), &ThresholdTable::defaults(), &msg).await;
    assert_matches!(
        outcome,
        ProcessOutcome::Stored {
            alert: AlertOutcome::Raised { severity: Severity::Critical, .. },
            ..
        }
    );
    assert_eq!(
        store.alerts()[0].1.violated_keys,
        json!(["temperature", "humidity", "voltage"])
    );
}

#[tokio::test]
async fn in_band_reading_is_stored_without_alert() {
    let store = FakeStore::new();
    let msg = message("sensor/humidity", r#"{"humidity": 45.0, "temperature": 22.1}"#);

    let outcome = process_message(store.as_ref(), &ThresholdTable::defaults(), &msg).await;
    assert_matches!(outcome, ProcessOutcome::Stored { alert: AlertOutcome::NotRaised, .. });
    assert_eq!(store.readings().len(), 1);
    assert!(store.alerts().is_empty());
}

#[tokio::test]
async fn unrecognized_keys_only_still_store_raw_payload() {
    let store = FakeStore::new();
    let msg = message("sensor/power", r#"{"power": 1500, "energy": 12.5}"#);

    let outcome = process_message(store.as_ref(), &ThresholdTable::defaults(), &msg).await;
    assert_matches!(outcome, ProcessOutcome::Stored { alert: AlertOutcome::NotRaised, .. });

    let readings = store.readings();
    assert_eq!(readings[0].1.values.reported_count(), 0);
    assert_eq!(readings[0].1.raw_payload, r#"{"power": 1500, "energy": 12.5}"#);
}

#[tokio::test]
async fn undecodable_body_is_dropped() {
    let store = FakeStore::new();

    for body in ["not-json", "[1, 2]", r#"{"voltage": "high"}"#] {
        let outcome =
            process_message(store.as_ref(), &ThresholdTable::defaults(), &message("sensor/voltage", body)).await;
        assert_matches!(outcome, ProcessOutcome::Dropped(_));
    }

    assert!(store.readings().is_empty());
    assert!(store.alerts().is_empty());
}

#[tokio::test]
async fn reading_failure_skips_evaluation() {
    let store = FakeStore::new();
    store.fail_readings(true);
    let msg = message("sensor/voltage", r#"{"voltage": 400}"#);

    let outcome = process_message(store.as_ref(), &ThresholdTable::defaults(), &msg).await;
    assert_matches!(outcome, ProcessOutcome::ReadingFailed(_));
    assert!(store.readings().is_empty());
    assert!(store.alerts().is_empty());
}

#[tokio::test]
async fn alert_failure_keeps_reading() {
    let store = FakeStore::new();
    store.fail_alerts(true);
    let msg = message("sensor/current", r#"{"current": 45}"#);

    let outcome = process_message(store.as_ref(), &ThresholdTable::defaults(), &msg).await;
    assert_matches!(outcome, ProcessOutcome::Stored { alert: AlertOutcome::Failed(_), .. });
    assert_eq!(store.readings().len(), 1);
    assert!(store.alerts().is_empty());
}

#[tokio::test]
async fn concurrent_duplicates_are_not_deduplicated() {
    let store = FakeStore::new();
    let thresholds = ThresholdTable::defaults();
    let msg = message("sensor/pressure", r#"{"pressure": 1200}"#);

    let (first, second) = futures::join!(
        process_message(store.as_ref(), &thresholds, &msg),
        process_message(store.as_ref(), &thresholds, &msg),
    );

    let first_id = assert_matches!(first, ProcessOutcome::Stored { reading_id, .. } => reading_id);
    let second_id = assert_matches!(second, ProcessOutcome::Stored { reading_id, .. } => reading_id);
    assert_ne!(first_id, second_id);

    assert_eq!(store.readings().len(), 2);
    let alerts = store.alerts();
    assert_eq!(alerts.len(), 2);
    assert_ne!(alerts[0].1.reading_id, alerts[1].1.reading_id);
}

#[tokio::test]
async fn custom_table_changes_the_verdict() {
    let store = FakeStore::new();
    let strict = ThresholdTable::new([(
        gridwatch_core::parameters::Parameter::Temperature,
        gridwatch_core::thresholds::ThresholdLimit::new(0.0, 20.0).unwrap(),
    )]);
    let msg = message("sensor/temperature", r#"{"temperature": 25, "voltage": 999}"#);

    process_message(store.as_ref(), &strict, &msg).await;
    let alerts = store.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].1.violated_keys, json!(["temperature"]));
}
