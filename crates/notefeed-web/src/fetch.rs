//! Multi-relay fetcher with first-non-empty fallback.

use std::sync::Arc;

use nostr::Filter;
use notefeed_core::PostRecord;

use crate::relay::RelaySource;

/// Try relays in order and keep the first non-empty answer.
///
/// Relays are assumed to carry much the same data, so answers are never
/// merged.
#[derive(Debug, Clone)]
pub struct Fetcher<S> {
    source: S,
    relays: Arc<[String]>,
}

impl<S: RelaySource> Fetcher<S> {
    /// Query `relays`, in order, through `source`.
    pub fn new(source: S, relays: Arc<[String]>) -> Self {
        Self { source, relays }
    }

    /// Run `filter` against each relay until one returns records.
    ///
    /// Returns empty when every relay is empty or the relay list is.
    pub async fn fetch(&self, filter: &Filter) -> Vec<PostRecord> {
        for relay in self.relays.iter() {
            let records = self.source.query(relay, filter).await;
            if !records.is_empty() {
                tracing::debug!(relay = %relay, records = records.len(), "relay answered");
                return records;
            }
            tracing::debug!(relay = %relay, "relay returned nothing, trying next");
        }
        tracing::debug!(relays = self.relays.len(), "no relay returned records");
        Vec::new()
    }
}
