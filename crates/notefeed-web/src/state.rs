//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::config::Config;
use crate::identity::{HttpDirectory, Identity};
use crate::pipeline::Pipeline;
use crate::relay::WsRelayClient;

/// Shared application state available to all request handlers.
///
/// Holds nothing mutable. Each request builds its own [`Pipeline`] from
/// the configuration.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Config>,

    /// NIP-05 directory client.
    pub directory: HttpDirectory,
}

impl AppState {
    /// Create a new application state from configuration.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let directory = HttpDirectory::new()?;

        tracing::info!(
            relays = config.relays.len(),
            page_size = config.page_size,
            "application state initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            directory,
        })
    }

    /// Build the aggregation pipeline for one request.
    pub fn pipeline(&self) -> Pipeline<WsRelayClient, HttpDirectory> {
        let config = &self.config;
        Pipeline::new(
            WsRelayClient::new(config.relay_timeout),
            config.relays.clone(),
            self.directory.clone(),
            Identity {
                pubkey: config.pubkey.clone(),
                handle: config.handle.clone(),
                fallback_pubkey: config.fallback_pubkey.clone(),
            },
            config.page_size,
            config.lookback,
        )
    }
}
