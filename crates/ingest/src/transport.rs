//! Messaging transport abstraction.
//!
//! A [`Transport`] knows how to open a [`Session`] with a broker. A session
//! accepts subscriptions and yields inbound messages until the broker closes
//! it or the connection fails. Reconnect policy lives in
//! [`crate::reconnect`], not in the transport.

use async_trait::async_trait;

/// A message received on a subscribed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl InboundMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// Connection-level failures. All of them send the loop back to
/// `Disconnected` and trigger a reconnect after the fixed delay.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to establish the connection, or it dropped mid-stream.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The broker refused a subscription request.
    #[error("Subscribe error: {0}")]
    Subscribe(String),

    /// The broker closed the session.
    #[error("Session closed by broker")]
    Closed,
}

/// Factory for broker sessions.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a new session. Resolves once the broker has accepted the
    /// connection.
    async fn connect(&self) -> Result<Box<dyn Session>, TransportError>;

    /// Human-readable broker address for logs.
    fn endpoint(&self) -> String;
}

/// One live broker session.
#[async_trait]
pub trait Session: Send {
    /// Subscribe to every topic in `topics` with at-least-once delivery.
    ///
    /// The whole list goes out as one request. A refusal from the broker may
    /// only surface later, as an error from [`next_message`](Self::next_message).
    async fn subscribe(&mut self, topics: &[String]) -> Result<(), TransportError>;

    /// Wait for the next inbound message.
    ///
    /// Returns [`TransportError::Closed`] when the broker ends the session.
    async fn next_message(&mut self) -> Result<InboundMessage, TransportError>;

    /// Best-effort disconnect. Never fails.
    async fn disconnect(&mut self);
}

impl std::fmt::Debug for dyn Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Session")
    }
}
