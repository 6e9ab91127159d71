//! MQTT implementation of [`Transport`] on top of `rumqttc`.
//!
//! `rumqttc` splits a connection into an [`AsyncClient`] (requests) and an
//! [`EventLoop`] (network I/O). A [`MqttSession`] owns both and drives the
//! event loop itself, so nothing runs in the background between
//! [`Session::next_message`] calls. Its own reconnect behaviour is not used:
//! any event-loop error ends the session and the ingestion loop decides when
//! to connect again.

use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{
    AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Packet, QoS, SubscribeFilter,
    SubscribeReasonCode,
};

use crate::transport::{InboundMessage, Session, Transport, TransportError};

/// Default broker port for plain MQTT.
pub const DEFAULT_MQTT_PORT: u16 = 1883;

/// Default keep-alive interval.
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(60);

/// Default upper bound on a single MQTT packet, in either direction.
pub const DEFAULT_MAX_PACKET_SIZE: usize = 1024 * 1024;

/// Capacity of the client request channel. A session only queues one
/// subscribe request and one disconnect.
const REQUEST_CHANNEL_CAPACITY: usize = 16;

/// Broker connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    /// Must be non-empty.
    pub client_id: String,
    pub keep_alive: Duration,
    /// Larger packets end the session, so this bounds the largest payload
    /// that can be ingested.
    pub max_packet_size: usize,
}

/// Opens clean MQTT sessions against one broker.
pub struct MqttTransport {
    config: BrokerConfig,
}

impl MqttTransport {
    pub fn new(config: BrokerConfig) -> Self {
        Self { config }
    }

    fn options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(
            self.config.client_id.clone(),
            self.config.host.clone(),
            self.config.port,
        );
        options.set_keep_alive(self.config.keep_alive);
        options.set_clean_session(true);
        options.set_max_packet_size(self.config.max_packet_size, self.config.max_packet_size);
        options
    }
}

#[async_trait]
impl Transport for MqttTransport {
    async fn connect(&self) -> Result<Box<dyn Session>, TransportError> {
        let (client, mut event_loop) = AsyncClient::new(self.options(), REQUEST_CHANNEL_CAPACITY);

        // The event loop dials on first poll; wait for the broker's CONNACK.
        loop {
            let event = event_loop
                .poll()
                .await
                .map_err(|e| TransportError::Connection(e.to_string()))?;

            if let Event::Incoming(Packet::ConnAck(ack)) = event {
                if ack.code != ConnectReturnCode::Success {
                    return Err(TransportError::Connection(format!(
                        "broker refused connection: {:?}",
                        ack.code
                    )));
                }
                break;
            }
        }

        Ok(Box::new(MqttSession {
            client,
            event_loop,
            topics: Vec::new(),
        }))
    }

    fn endpoint(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }
}

/// One connected MQTT session.
pub struct MqttSession {
    client: AsyncClient,
    event_loop: EventLoop,
    /// Filters of the outstanding subscribe request, in SUBACK order.
    topics: Vec<String>,
}

impl MqttSession {
    /// Fail if the broker refused any filter of the subscribe request.
    fn check_suback(&self, codes: &[SubscribeReasonCode]) -> Result<(), TransportError> {
        let refused: Vec<&str> = codes
            .iter()
            .enumerate()
            .filter(|(_, code)| matches!(code, SubscribeReasonCode::Failure))
            .map(|(i, _)| self.topics.get(i).map_or("<unknown>", String::as_str))
            .collect();

        if refused.is_empty() {
            Ok(())
        } else {
            Err(TransportError::Subscribe(format!(
                "broker refused {}",
                refused.join(", ")
            )))
        }
    }
}

#[async_trait]
impl Session for MqttSession {
    async fn subscribe(&mut self, topics: &[String]) -> Result<(), TransportError> {
        if topics.is_empty() {
            return Ok(());
        }

        // One request regardless of topic count; sent by the next poll.
        let filters = topics
            .iter()
            .map(|topic| SubscribeFilter::new(topic.clone(), QoS::AtLeastOnce));
        self.client
            .subscribe_many(filters)
            .await
            .map_err(|e| TransportError::Subscribe(e.to_string()))?;
        self.topics = topics.to_vec();
        Ok(())
    }

    async fn next_message(&mut self) -> Result<InboundMessage, TransportError> {
        loop {
            let event = self
                .event_loop
                .poll()
                .await
                .map_err(|e| TransportError::Connection(e.to_string()))?;

            match event {
                Event::Incoming(Packet::Publish(publish)) => {
                    return Ok(InboundMessage::new(publish.topic, publish.payload.to_vec()));
                }
                Event::Incoming(Packet::SubAck(ack)) => {
                    self.check_suback(&ack.return_codes)?;
                    tracing::debug!(pkid = ack.pkid, codes = ?ack.return_codes, "Subscription acknowledged");
                }
                Event::Incoming(Packet::Disconnect) => return Err(TransportError::Closed),
                _ => {}
            }
        }
    }

    async fn disconnect(&mut self) {
        if let Err(e) = self.client.try_disconnect() {
            tracing::debug!(error = %e, "Disconnect request not sent");
        }
    }
}
