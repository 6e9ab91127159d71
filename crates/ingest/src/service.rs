//! Long-running ingestion service.
//!
//! [`IngestionService`] owns one background task that runs the connection
//! loop: connect -> subscribe -> receive and process -> reconnect. The
//! current [`ConnectionState`] is published on a [`watch`] channel so the
//! read API can report it without touching the loop.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use gridwatch_core::thresholds::ThresholdTable;

use crate::processor::process_message;
use crate::reconnect::{connect_with_retry, wait_before_retry, ReconnectConfig};
use crate::store::RecordStore;
use crate::transport::{Session, Transport, TransportError};

/// Lifecycle of the broker connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    /// Subscribed and waiting for messages.
    Connected,
    /// Handling a message.
    Processing,
    /// The service was stopped and the loop has exited.
    Stopped,
}

/// Everything the loop needs besides the transport.
pub struct IngestionContext {
    pub store: Arc<dyn RecordStore>,
    pub thresholds: Arc<ThresholdTable>,
    /// Topics subscribed on every (re)connect, in order.
    pub topics: Vec<String>,
    pub reconnect: ReconnectConfig,
}

/// Handle to the running ingestion loop.
///
/// Created once at startup via [`IngestionService::start`]. The returned
/// `Arc` can be cloned freely; [`stop`](Self::stop) is idempotent.
pub struct IngestionService {
    cancel: CancellationToken,
    state_rx: watch::Receiver<ConnectionState>,
    task_handle: Mutex<Option<JoinHandle<()>>>,
}

impl IngestionService {
    /// Spawn the connection loop and return immediately.
    pub fn start(transport: Arc<dyn Transport>, context: IngestionContext) -> Arc<Self> {
        let cancel = CancellationToken::new();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);

        let loop_cancel = cancel.clone();
        let task_handle = tokio::spawn(async move {
            tracing::info!(
                endpoint = %transport.endpoint(),
                topics = ?context.topics,
                "Starting ingestion loop",
            );
            run_ingestion_loop(transport.as_ref(), &context, &loop_cancel, &state_tx).await;
            state_tx.send_replace(ConnectionState::Stopped);
            tracing::info!("Ingestion loop exited");
        });

        Arc::new(Self {
            cancel,
            state_rx,
            task_handle: Mutex::new(Some(task_handle)),
        })
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// A receiver that observes every state change.
    pub fn state_watch(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Request shutdown. Does not wait for the loop to exit.
    ///
    /// A message already being processed runs to completion; no new
    /// message is taken after this call.
    pub fn stop(&self) {
        if !self.cancel.is_cancelled() {
            tracing::info!("Stopping ingestion service");
            self.cancel.cancel();
        }
    }

    /// Wait until the loop task has exited. Returns immediately if it
    /// already has been joined.
    pub async fn wait_stopped(&self) {
        let handle = self.task_handle.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Ingestion task terminated abnormally");
            }
        }
    }
}

/// Why a session ended.
enum SessionEnd {
    Cancelled,
    Lost(TransportError),
}

/// Core connection loop. Runs until `cancel` is triggered.
async fn run_ingestion_loop(
    transport: &dyn Transport,
    context: &IngestionContext,
    cancel: &CancellationToken,
    state: &watch::Sender<ConnectionState>,
) {
    loop {
        let Some(mut session) =
            connect_with_retry(transport, &context.reconnect, cancel, state).await
        else {
            return;
        };

        let end = match subscribe_all(session.as_mut(), &context.topics, cancel).await {
            Ok(()) => {
                state.send_replace(ConnectionState::Connected);
                receive_messages(session.as_mut(), context, cancel, state).await
            }
            Err(end) => end,
        };

        session.disconnect().await;
        state.send_replace(ConnectionState::Disconnected);

        match end {
            SessionEnd::Cancelled => return,
            SessionEnd::Lost(e) => {
                tracing::warn!(
                    error = %e,
                    delay_ms = context.reconnect.delay.as_millis() as u64,
                    "Connection lost, reconnecting",
                );
                if !wait_before_retry(&context.reconnect, cancel).await {
                    return;
                }
            }
        }
    }
}

/// Subscribe to every configured topic, giving up if `cancel` fires first.
async fn subscribe_all(
    session: &mut dyn Session,
    topics: &[String],
    cancel: &CancellationToken,
) -> Result<(), SessionEnd> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SessionEnd::Cancelled),
        result = session.subscribe(topics) => {
            result.map_err(SessionEnd::Lost)?;
            tracing::info!(topics = ?topics, "Subscribed");
            Ok(())
        }
    }
}

/// Receive and process messages until the session ends or `cancel` fires.
async fn receive_messages(
    session: &mut dyn Session,
    context: &IngestionContext,
    cancel: &CancellationToken,
    state: &watch::Sender<ConnectionState>,
) -> SessionEnd {
    loop {
        let received = tokio::select! {
            biased;
            _ = cancel.cancelled() => return SessionEnd::Cancelled,
            received = session.next_message() => received,
        };

        let message = match received {
            Ok(message) => message,
            Err(e) => return SessionEnd::Lost(e),
        };

        state.send_replace(ConnectionState::Processing);
        let outcome = process_message(context.store.as_ref(), &context.thresholds, &message).await;
        tracing::trace!(topic = %message.topic, ?outcome, "Message processed");
        state.send_replace(ConnectionState::Connected);
    }
}
