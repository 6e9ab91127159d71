//! Fixed-delay reconnection logic for the broker connection.
//!
//! When the broker is unreachable or a session drops, the ingestion loop
//! calls [`connect_with_retry`] to keep retrying at a constant interval
//! until either a session is established or the [`CancellationToken`] is
//! triggered.

use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::service::ConnectionState;
use crate::transport::{Session, Transport};

/// Delay between reconnect attempts when nothing else is configured.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Tunable parameters for the reconnect strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectConfig {
    /// Constant wait between a failure and the next attempt.
    pub delay: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}

/// Sleep for the configured delay.
///
/// Returns `false` if `cancel` fired before the delay elapsed.
pub async fn wait_before_retry(config: &ReconnectConfig, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(config.delay) => true,
    }
}

/// Open a session, retrying at a fixed interval.
///
/// Publishes `Connecting` before each attempt and `Disconnected` after each
/// failure. Returns `Some(session)` once the broker accepts a connection,
/// or `None` if `cancel` is triggered first.
pub async fn connect_with_retry(
    transport: &dyn Transport,
    config: &ReconnectConfig,
    cancel: &CancellationToken,
    state: &watch::Sender<ConnectionState>,
) -> Option<Box<dyn Session>> {
    let mut attempt = 0u32;

    loop {
        if cancel.is_cancelled() {
            return None;
        }

        attempt += 1;
        state.send_replace(ConnectionState::Connecting);
        tracing::info!(
            endpoint = %transport.endpoint(),
            attempt,
            "Connecting to broker",
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("Connect cancelled");
                state.send_replace(ConnectionState::Disconnected);
                return None;
            }
            result = transport.connect() => {
                match result {
                    Ok(session) => {
                        tracing::info!(
                            endpoint = %transport.endpoint(),
                            attempt,
                            "Connected to broker",
                        );
                        return Some(session);
                    }
                    Err(e) => {
                        tracing::warn!(
                            endpoint = %transport.endpoint(),
                            error = %e,
                            delay_ms = config.delay.as_millis() as u64,
                            "Connect attempt {attempt} failed",
                        );
                    }
                }
            }
        }

        state.send_replace(ConnectionState::Disconnected);
        if !wait_before_retry(config, cancel).await {
            return None;
        }
    }
}
