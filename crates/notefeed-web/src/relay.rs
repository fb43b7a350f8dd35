//! Relay query client.
//!
//! One call opens one WebSocket, sends one `REQ` and collects `EVENT`
//! frames until the relay signals end of stored events, closes the
//! subscription, or the deadline passes. Nothing here ever fails: a relay
//! that cannot be reached or misbehaves simply contributes no records.

use std::collections::HashSet;
use std::future::Future;
use std::time::{Duration, Instant};

use futures::{SinkExt, StreamExt};
use nostr::{Event, Filter, RelayMessage, SubscriptionId};
use notefeed_core::PostRecord;
use notefeed_core::message::{client_close, client_req, decode_relay_message};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};

/// Default per-relay deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Subscription label sent with every request.
pub const DEFAULT_SUBSCRIPTION_ID: &str = "feed";

/// A source of records answering one filter at a time.
pub trait RelaySource: Send + Sync {
    /// Query one relay. Returns whatever the relay delivered, possibly
    /// nothing. Never errors.
    fn query(
        &self,
        relay_url: &str,
        filter: &Filter,
    ) -> impl Future<Output = Vec<PostRecord>> + Send;
}

/// [`RelaySource`] over a fresh WebSocket connection per query.
#[derive(Debug, Clone)]
pub struct WsRelayClient {
    timeout: Duration,
    subscription_id: SubscriptionId,
}

impl Default for WsRelayClient {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl WsRelayClient {
    /// Create a client with the given per-relay deadline.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            subscription_id: SubscriptionId::new(DEFAULT_SUBSCRIPTION_ID),
        }
    }

    /// Use a different subscription label.
    pub fn with_subscription_id(mut self, subscription_id: impl Into<String>) -> Self {
        self.subscription_id = SubscriptionId::new(subscription_id);
        self
    }

    /// Connect, subscribe and read until the relay is done with us.
    ///
    /// Records land in `collected` as they arrive so that the caller keeps
    /// them when this future is cut short by the deadline.
    async fn exchange(
        &self,
        relay_url: &str,
        filter: &Filter,
        collected: &mut Collected,
    ) -> Result<(), tungstenite::Error> {
        let (mut ws, _) = connect_async(relay_url).await?;
        ws.send(Message::text(client_req(&self.subscription_id, filter)))
            .await?;

        while let Some(frame) = ws.next().await {
            let text = match frame? {
                Message::Text(text) => text,
                Message::Close(_) => return Ok(()),
                _ => continue,
            };

            let message = match decode_relay_message(text.as_str()) {
                Ok(message) => message,
                Err(e) => {
                    tracing::debug!(relay = %relay_url, error = %e, "ignoring unreadable frame");
                    continue;
                }
            };

            match message {
                RelayMessage::Event {
                    subscription_id,
                    event,
                } if *subscription_id == self.subscription_id => {
                    collected.push(&event);
                }
                RelayMessage::EndOfStoredEvents(subscription_id)
                    if *subscription_id == self.subscription_id =>
                {
                    // Best effort; the records are already in hand.
                    let _ = ws
                        .send(Message::text(client_close(&self.subscription_id)))
                        .await;
                    let _ = ws.close(None).await;
                    return Ok(());
                }
                RelayMessage::Closed {
                    subscription_id,
                    message,
                } if *subscription_id == self.subscription_id => {
                    tracing::debug!(relay = %relay_url, reason = %message, "subscription closed by relay");
                    return Ok(());
                }
                RelayMessage::Notice(message) => {
                    tracing::debug!(relay = %relay_url, notice = %message, "relay notice");
                }
                _ => {}
            }
        }

        Ok(())
    }
}

impl RelaySource for WsRelayClient {
    async fn query(&self, relay_url: &str, filter: &Filter) -> Vec<PostRecord> {
        let started = Instant::now();
        let mut collected = Collected::default();

        let outcome =
            tokio::time::timeout(self.timeout, self.exchange(relay_url, filter, &mut collected))
                .await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match outcome {
            Ok(Ok(())) => {
                tracing::debug!(
                    relay = %relay_url,
                    records = collected.records.len(),
                    elapsed_ms,
                    "relay query complete"
                );
                collected.records
            }
            Ok(Err(e)) => {
                tracing::warn!(relay = %relay_url, error = %e, elapsed_ms, "relay query failed");
                Vec::new()
            }
            Err(_) => {
                tracing::debug!(
                    relay = %relay_url,
                    records = collected.records.len(),
                    elapsed_ms,
                    "relay query timed out"
                );
                collected.records
            }
        }
    }
}

/// Records accepted so far in one response, first occurrence per id.
#[derive(Debug, Default)]
struct Collected {
    records: Vec<PostRecord>,
    seen: HashSet<nostr::EventId>,
}

impl Collected {
    fn push(&mut self, event: &Event) {
        if self.seen.insert(event.id) {
            self.records.push(PostRecord::from(event));
        }
    }
}
