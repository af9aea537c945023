//! Live pool-creation feed.
//!
//! Subscribes to the AMM program's logs and turns every successful
//! pool initialisation into a [`DiscoveryEvent`] on a channel. The
//! subscription is reopened after unexpected closure, a bounded number of
//! times, with a fixed delay.

use crate::error::{Result, SniperError};
use crate::types::DiscoveryEvent;
use futures::StreamExt;
use solana_client::nonblocking::pubsub_client::PubsubClient;
use solana_client::rpc_config::{RpcTransactionLogsConfig, RpcTransactionLogsFilter};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Log line emitted by the AMM when a pool is initialised.
pub const POOL_INIT_MARKER: &str = "initialize2";

/// Event for a pool-creation log batch; `None` for anything else.
pub fn pool_creation_event(signature: &str, failed: bool, logs: &[String]) -> Option<DiscoveryEvent> {
    if failed || !logs.iter().any(|line| line.contains(POOL_INIT_MARKER)) {
        return None;
    }
    Some(DiscoveryEvent::new(signature))
}

enum StreamEnd {
    Shutdown,
    /// The server closed the stream; `delivered` if any message arrived first
    Closed { delivered: bool },
}

/// Consecutive reconnects allowed before giving up. A session only counts
/// as healthy once it delivered at least one message.
struct ReconnectBudget {
    max_attempts: u32,
    failures: u32,
}

impl ReconnectBudget {
    fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            failures: 0,
        }
    }

    /// Account for a lost session and return the attempt number to make next.
    fn next_attempt(&mut self, delivered: bool) -> Result<u32> {
        if delivered {
            self.failures = 0;
        }
        self.failures += 1;
        if self.failures > self.max_attempts {
            return Err(SniperError::ReconnectExhausted {
                attempts: self.max_attempts,
            });
        }
        Ok(self.failures)
    }
}

pub struct LogSubscriber {
    ws_url: String,
    program: Pubkey,
    reconnect_delay: Duration,
    reconnect_attempts: u32,
}

impl LogSubscriber {
    pub fn new(ws_url: String, program: Pubkey, reconnect_delay: Duration, reconnect_attempts: u32) -> Self {
        Self {
            ws_url,
            program,
            reconnect_delay,
            reconnect_attempts,
        }
    }

    /// Feed `events` until shutdown, or fail once reconnects are exhausted.
    ///
    /// Failing to open the very first subscription is a startup failure.
    pub async fn run(
        &self,
        events: mpsc::Sender<DiscoveryEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        let mut ever_connected = false;
        let mut budget = ReconnectBudget::new(self.reconnect_attempts);

        loop {
            if *shutdown.borrow() {
                return Ok(());
            }

            let delivered = match self.stream_once(&events, &mut shutdown, &mut ever_connected).await {
                Ok(StreamEnd::Shutdown) => {
                    info!("Log subscription closed for shutdown");
                    return Ok(());
                }
                Ok(StreamEnd::Closed { delivered }) => {
                    warn!(delivered, "Log subscription closed unexpectedly");
                    delivered
                }
                Err(err) if !ever_connected => {
                    return Err(SniperError::FatalStartup(format!(
                        "cannot open log subscription: {err}"
                    )));
                }
                Err(err) => {
                    warn!("Log subscription failed: {}", err);
                    false
                }
            };

            let attempt = budget.next_attempt(delivered)?;
            info!(
                attempt,
                max = self.reconnect_attempts,
                "Reconnecting in {:?}",
                self.reconnect_delay
            );
            tokio::time::sleep(self.reconnect_delay).await;
        }
    }

    async fn stream_once(
        &self,
        events: &mpsc::Sender<DiscoveryEvent>,
        shutdown: &mut watch::Receiver<bool>,
        ever_connected: &mut bool,
    ) -> Result<StreamEnd> {
        let client = PubsubClient::new(&self.ws_url)
            .await
            .map_err(|e| SniperError::TransientNetwork(e.to_string()))?;
        let (mut stream, unsubscribe) = client
            .logs_subscribe(
                RpcTransactionLogsFilter::Mentions(vec![self.program.to_string()]),
                RpcTransactionLogsConfig {
                    commitment: Some(CommitmentConfig::confirmed()),
                },
            )
            .await
            .map_err(|e| SniperError::TransientNetwork(e.to_string()))?;

        *ever_connected = true;
        info!(program = %self.program, "Subscribed to pool creation logs");

        let mut delivered = false;
        let end = loop {
            tokio::select! {
                _ = shutdown.changed() => break StreamEnd::Shutdown,
                next = stream.next() => {
                    let Some(response) = next else { break StreamEnd::Closed { delivered } };
                    delivered = true;
                    let logs = response.value;
                    let Some(event) = pool_creation_event(&logs.signature, logs.err.is_some(), &logs.logs) else {
                        continue;
                    };
                    debug!(tx = %event.transaction_id, "Pool creation observed");
                    if events.send(event).await.is_err() {
                        break StreamEnd::Shutdown;
                    }
                }
            }
        };

        unsubscribe().await;
        Ok(end)
    }
}
