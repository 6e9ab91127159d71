//! Telemetry ingestion and alerting pipeline.
//!
//! Owns the messaging connection (connect, subscribe, receive, reconnect
//! after a fixed delay), decodes each message, persists the raw reading,
//! evaluates thresholds and persists an alert when any band is breached.
//!
//! The transport and the record store are injected as trait objects so the
//! whole loop runs against fakes in tests.

pub mod mqtt;
pub mod processor;
pub mod reconnect;
pub mod service;
pub mod store;
pub mod transport;
