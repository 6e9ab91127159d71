//! Shared fakes for ingestion tests.
//!
//! [`FakeTransport`] plays back a script of connect outcomes;
//! [`FakeStore`] keeps rows in memory and can be told to fail.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use gridwatch_core::types::DbId;
use gridwatch_db::models::alert::CreateAlert;
use gridwatch_db::models::reading::CreateSensorReading;
use gridwatch_ingest::store::{RecordStore, StoreError};
use gridwatch_ingest::transport::{InboundMessage, Session, Transport, TransportError};

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// How a scripted session behaves once its queued messages run out.
#[derive(Debug, Clone, Copy)]
pub enum SessionTail {
    /// Broker closes the session.
    Close,
    /// Network error.
    Fail,
    /// Waits forever.
    Hang,
}

/// One scripted `connect` outcome.
pub enum ConnectPlan {
    Refuse,
    Accept(Vec<InboundMessage>, SessionTail),
    /// Connects, but the subscribe request never completes.
    StallSubscribe,
}

/// Scripted transport. Once the script is exhausted every connect yields an
/// idle session that never delivers anything.
#[derive(Default)]
pub struct FakeTransport {
    plans: Mutex<VecDeque<ConnectPlan>>,
    connect_attempts: AtomicUsize,
    disconnects: Arc<AtomicUsize>,
    subscriptions: Arc<Mutex<Vec<String>>>,
}

impl FakeTransport {
    pub fn new(plans: Vec<ConnectPlan>) -> Arc<Self> {
        Arc::new(Self {
            plans: Mutex::new(plans.into()),
            ..Default::default()
        })
    }

    pub fn connect_attempts(&self) -> usize {
        self.connect_attempts.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    pub fn subscriptions(&self) -> Vec<String> {
        self.subscriptions.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn connect(&self) -> Result<Box<dyn Session>, TransportError> {
        self.connect_attempts.fetch_add(1, Ordering::SeqCst);
        let plan = self
            .plans
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ConnectPlan::Accept(Vec::new(), SessionTail::Hang));

        match plan {
            ConnectPlan::Refuse => Err(TransportError::Connection("connection refused".into())),
            ConnectPlan::Accept(messages, tail) => Ok(Box::new(FakeSession {
                messages: messages.into(),
                tail,
                stall_subscribe: false,
                disconnects: Arc::clone(&self.disconnects),
                subscriptions: Arc::clone(&self.subscriptions),
            })),
            ConnectPlan::StallSubscribe => Ok(Box::new(FakeSession {
                messages: VecDeque::new(),
                tail: SessionTail::Hang,
                stall_subscribe: true,
                disconnects: Arc::clone(&self.disconnects),
                subscriptions: Arc::clone(&self.subscriptions),
            })),
        }
    }

    fn endpoint(&self) -> String {
        "fake:1883".into()
    }
}

struct FakeSession {
    messages: VecDeque<InboundMessage>,
    tail: SessionTail,
    stall_subscribe: bool,
    disconnects: Arc<AtomicUsize>,
    subscriptions: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Session for FakeSession {
    async fn subscribe(&mut self, topics: &[String]) -> Result<(), TransportError> {
        self.subscriptions.lock().unwrap().extend_from_slice(topics);
        if self.stall_subscribe {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn next_message(&mut self) -> Result<InboundMessage, TransportError> {
        if let Some(message) = self.messages.pop_front() {
            return Ok(message);
        }
        match self.tail {
            SessionTail::Close => Err(TransportError::Closed),
            SessionTail::Fail => Err(TransportError::Connection("connection reset".into())),
            SessionTail::Hang => std::future::pending().await,
        }
    }

    async fn disconnect(&mut self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// In-memory [`RecordStore`] with switchable failures.
#[derive(Default)]
pub struct FakeStore {
    next_id: AtomicI64,
    readings: Mutex<Vec<(DbId, CreateSensorReading)>>,
    alerts: Mutex<Vec<(DbId, CreateAlert)>>,
    fail_readings: AtomicBool,
    fail_alerts: AtomicBool,
}

impl FakeStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_readings(&self, fail: bool) {
        self.fail_readings.store(fail, Ordering::SeqCst);
    }

    pub fn fail_alerts(&self, fail: bool) {
        self.fail_alerts.store(fail, Ordering::SeqCst);
    }

    pub fn readings(&self) -> Vec<(DbId, CreateSensorReading)> {
        self.readings.lock().unwrap().clone()
    }

    pub fn alerts(&self) -> Vec<(DbId, CreateAlert)> {
        self.alerts.lock().unwrap().clone()
    }

    fn assign_id(&self) -> DbId {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl RecordStore for FakeStore {
    async fn insert_reading(&self, reading: &CreateSensorReading) -> Result<DbId, StoreError> {
        // Give concurrent callers a chance to interleave.
        tokio::task::yield_now().await;
        if self.fail_readings.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("readings table offline".into()));
        }
        let id = self.assign_id();
        self.readings.lock().unwrap().push((id, reading.clone()));
        Ok(id)
    }

    async fn insert_alert(&self, alert: &CreateAlert) -> Result<DbId, StoreError> {
        tokio::task::yield_now().await;
        if self.fail_alerts.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("alerts table offline".into()));
        }
        let id = self.assign_id();
        self.alerts.lock().unwrap().push((id, alert.clone()));
        Ok(id)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn message(topic: &str, body: &str) -> InboundMessage {
    InboundMessage::new(topic, body.as_bytes().to_vec())
}

/// Poll `condition` every few milliseconds until it holds or two seconds
/// pass.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met within 2s"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
