//! Author identity resolution.
//!
//! A literal hex key always wins. Otherwise the NIP-05 handle is looked up
//! in the domain's `/.well-known/nostr.json` directory, and if that fails
//! for any reason the configured fallback key is used.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use notefeed_core::is_hex_key;
use serde::Deserialize;

/// Deadline for one directory lookup.
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Configured identity inputs, highest priority first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    /// Literal hex key.
    pub pubkey: Option<String>,
    /// NIP-05 handle, `name@domain`.
    pub handle: Option<String>,
    /// Used when the handle cannot be resolved.
    pub fallback_pubkey: Option<String>,
}

/// Directory lookup failure.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// Connection, TLS or timeout failure.
    #[error("directory request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The directory answered with a non-success status.
    #[error("directory returned status {0}")]
    Status(reqwest::StatusCode),

    /// The body was not a valid directory document.
    #[error("invalid directory document: {0}")]
    Payload(#[from] serde_json::Error),
}

/// A NIP-05 style name directory.
pub trait DirectoryLookup: Send + Sync {
    /// Look up `name` in `domain`'s directory. `Ok(None)` means the
    /// directory has no entry for the name.
    fn lookup(
        &self,
        name: &str,
        domain: &str,
    ) -> impl Future<Output = Result<Option<String>, LookupError>> + Send;
}

/// The `nostr.json` document.
#[derive(Debug, Deserialize)]
struct DirectoryDocument {
    #[serde(default)]
    names: HashMap<String, String>,
}

/// [`DirectoryLookup`] over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpDirectory {
    client: reqwest::Client,
    scheme: &'static str,
}

impl HttpDirectory {
    /// Build a client with [`LOOKUP_TIMEOUT`].
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(LOOKUP_TIMEOUT)
            .user_agent(concat!("notefeed/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            scheme: "https",
        })
    }

    #[cfg(test)]
    fn plain_http(mut self) -> Self {
        self.scheme = "http";
        self
    }
}

impl DirectoryLookup for HttpDirectory {
    async fn lookup(&self, name: &str, domain: &str) -> Result<Option<String>, LookupError> {
        let url = format!("{}://{domain}/.well-known/nostr.json", self.scheme);
        let response = self
            .client
            .get(&url)
            .query(&[("name", name)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status));
        }

        let body = response.bytes().await?;
        let document: DirectoryDocument = serde_json::from_slice(&body)?;
        Ok(document.names.get(name).cloned())
    }
}

/// Split `name@domain` at the first `@`. Both halves must be non-empty.
fn split_handle(handle: &str) -> Option<(&str, &str)> {
    let (name, domain) = handle.trim().split_once('@')?;
    if name.is_empty() || domain.is_empty() {
        return None;
    }
    Some((name, domain))
}

/// Determine the author key, or `None` if nothing usable is configured.
///
/// A literal key of the right shape is returned without any I/O.
pub async fn resolve_identity<D: DirectoryLookup>(
    identity: &Identity,
    directory: &D,
) -> Option<String> {
    if let Some(pubkey) = identity.pubkey.as_deref() {
        if is_hex_key(pubkey) {
            return Some(pubkey.to_ascii_lowercase());
        }
        tracing::warn!(pubkey = %pubkey, "configured pubkey is not a 64-char hex key, ignoring");
    }

    if let Some(handle) = identity.handle.as_deref() {
        match split_handle(handle) {
            Some((name, domain)) => match directory.lookup(name, domain).await {
                Ok(Some(pubkey)) if is_hex_key(&pubkey) => {
                    tracing::debug!(handle = %handle, pubkey = %pubkey, "handle resolved");
                    return Some(pubkey.to_ascii_lowercase());
                }
                Ok(Some(pubkey)) => {
                    tracing::warn!(handle = %handle, entry = %pubkey, "directory entry is not a hex key");
                }
                Ok(None) => {
                    tracing::warn!(handle = %handle, "handle not listed in directory");
                }
                Err(e) => {
                    tracing::warn!(handle = %handle, error = %e, "directory lookup failed");
                }
            },
            None => {
                tracing::warn!(handle = %handle, "handle is not of the form name@domain");
            }
        }
    }

    let fallback = identity
        .fallback_pubkey
        .as_deref()
        .filter(|pk| is_hex_key(pk))
        .map(str::to_ascii_lowercase);
    if fallback.is_some() {
        tracing::info!("using fallback pubkey");
    }
    fallback
}
