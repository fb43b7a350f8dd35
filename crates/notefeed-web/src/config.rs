//! Application configuration loaded from environment variables.

use std::sync::Arc;
use std::time::Duration;

use notefeed_core::is_hex_key;

/// Relays queried when `FEED_RELAYS` is not set, in priority order.
pub const DEFAULT_RELAYS: &[&str] = &[
    "wss://relay.nostr.band",
    "wss://relay.damus.io",
    "wss://nostr-pub.wellorder.net",
];

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8787").
    pub bind_addr: String,

    /// Literal author key (hex). Used without any lookup when valid.
    pub pubkey: Option<String>,

    /// NIP-05 handle (`name@domain`) resolved when no literal key is set.
    pub handle: Option<String>,

    /// Key used when the handle lookup fails.
    pub fallback_pubkey: Option<String>,

    /// Relay URLs, tried in order.
    pub relays: Arc<[String]>,

    /// Posts per page.
    pub page_size: usize,

    /// Per-relay query deadline.
    pub relay_timeout: Duration,

    /// How far back the primary post query reaches.
    pub lookback: Duration,

    /// Page heading and `<title>`.
    pub site_title: String,

    /// Base URL for outbound links to notes and profiles.
    pub link_base: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// At least one of `FEED_PUBKEY` or `FEED_HANDLE` should be set;
    /// otherwise every request answers 404.
    ///
    /// Optional:
    /// - `FEED_BIND_ADDR`: Server bind address (default: "0.0.0.0:8787")
    /// - `FEED_PUBKEY`: Hex author key
    /// - `FEED_HANDLE`: NIP-05 handle
    /// - `FEED_FALLBACK_PUBKEY`: Hex key used when the handle lookup fails
    /// - `FEED_RELAYS`: Comma-separated relay URLs
    /// - `FEED_PAGE_SIZE`: Posts per page (default: 250)
    /// - `FEED_RELAY_TIMEOUT_SECS`: Per-relay deadline (default: 5)
    /// - `FEED_LOOKBACK_DAYS`: Post window (default: 30)
    /// - `FEED_SITE_TITLE`: Heading (default: "My Notes on Nostr")
    /// - `FEED_LINK_BASE`: Link target base (default: "https://njump.me")
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr =
            std::env::var("FEED_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8787".to_string());

        let pubkey = non_empty_var("FEED_PUBKEY");
        let handle = non_empty_var("FEED_HANDLE");

        let fallback_pubkey = non_empty_var("FEED_FALLBACK_PUBKEY");
        if let Some(fallback) = &fallback_pubkey
            && !is_hex_key(fallback)
        {
            anyhow::bail!("FEED_FALLBACK_PUBKEY must be 64 hex characters, got {fallback:?}");
        }

        let relays: Vec<String> = match std::env::var("FEED_RELAYS") {
            Ok(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            Err(_) => DEFAULT_RELAYS.iter().map(|s| s.to_string()).collect(),
        };

        let page_size: usize = parse_var("FEED_PAGE_SIZE", 250)?;
        if page_size == 0 {
            anyhow::bail!("FEED_PAGE_SIZE must be at least 1");
        }

        let relay_timeout = Duration::from_secs(parse_var("FEED_RELAY_TIMEOUT_SECS", 5)?);
        let lookback_days: u64 = parse_var("FEED_LOOKBACK_DAYS", 30)?;
        let Some(lookback_secs) = lookback_days.checked_mul(24 * 60 * 60) else {
            anyhow::bail!("FEED_LOOKBACK_DAYS is too large: {lookback_days}");
        };
        let lookback = Duration::from_secs(lookback_secs);

        let site_title =
            std::env::var("FEED_SITE_TITLE").unwrap_or_else(|_| "My Notes on Nostr".to_string());

        let link_base = std::env::var("FEED_LINK_BASE")
            .unwrap_or_else(|_| "https://njump.me".to_string())
            .trim_end_matches('/')
            .to_string();

        if pubkey.is_none() && handle.is_none() {
            tracing::warn!("neither FEED_PUBKEY nor FEED_HANDLE is set; feed will be empty");
        }

        tracing::info!(
            bind_addr = %bind_addr,
            pubkey = pubkey.as_deref().unwrap_or("-"),
            handle = handle.as_deref().unwrap_or("-"),
            relay_count = relays.len(),
            page_size,
            relay_timeout_secs = relay_timeout.as_secs(),
            lookback_days,
            "feed configuration loaded"
        );

        Ok(Self {
            bind_addr,
            pubkey,
            handle,
            fallback_pubkey,
            relays: relays.into(),
            page_size,
            relay_timeout,
            lookback,
            site_title,
            link_base,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty_var(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("{key} has invalid value {raw:?}: {e}")),
        None => Ok(default),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mutex to serialize config tests that manipulate env vars.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const ENV_KEYS: &[&str] = &[
        "FEED_BIND_ADDR",
        "FEED_PUBKEY",
        "FEED_HANDLE",
        "FEED_FALLBACK_PUBKEY",
        "FEED_RELAYS",
        "FEED_PAGE_SIZE",
        "FEED_RELAY_TIMEOUT_SECS",
        "FEED_LOOKBACK_DAYS",
        "FEED_SITE_TITLE",
        "FEED_LINK_BASE",
    ];

    /// Helper to run config tests with isolated env vars.
    /// Uses a mutex to prevent concurrent env var races.
    fn with_env_vars<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());

        let saved: Vec<_> = ENV_KEYS
            .iter()
            .map(|k| (*k, std::env::var(k).ok()))
            .collect();

        // SAFETY: Serialized by mutex; only test code touches these vars.
        unsafe {
            for k in ENV_KEYS {
                std::env::remove_var(k);
            }
            for (k, v) in vars {
                std::env::set_var(k, v);
            }
        }

        f();

        // SAFETY: Restoring original env state.
        unsafe {
            for (k, v) in &saved {
                match v {
                    Some(val) => std::env::set_var(k, val),
                    None => std::env::remove_var(k),
                }
            }
        }
    }

    /// A config suitable for handler tests; no environment involved.
    pub(crate) fn test_config() -> Config {
        Config {
            bind_addr: "127.0.0.1:0".to_string(),
            pubkey: Some("a".repeat(64)),
            handle: None,
            fallback_pubkey: None,
            relays: Arc::from(Vec::<String>::new()),
            page_size: 250,
            relay_timeout: Duration::from_millis(200),
            lookback: Duration::from_secs(30 * 24 * 60 * 60),
            site_title: "Test Feed".to_string(),
            link_base: "https://njump.me".to_string(),
        }
    }

    #[test]
    fn config_defaults() {
        with_env_vars(&[], || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.bind_addr, "0.0.0.0:8787");
            assert!(config.pubkey.is_none());
            assert!(config.handle.is_none());
            assert!(config.fallback_pubkey.is_none());
            assert_eq!(config.relays.len(), 3);
            assert_eq!(config.relays[0], "wss://relay.nostr.band");
            assert_eq!(config.page_size, 250);
            assert_eq!(config.relay_timeout, Duration::from_secs(5));
            assert_eq!(config.lookback, Duration::from_secs(30 * 86_400));
            assert_eq!(config.site_title, "My Notes on Nostr");
            assert_eq!(config.link_base, "https://njump.me");
        });
    }

    #[test]
    fn config_custom_values() {
        let pk = "b".repeat(64);
        with_env_vars(
            &[
                ("FEED_BIND_ADDR", "127.0.0.1:9090"),
                ("FEED_PUBKEY", &pk),
                ("FEED_HANDLE", "alice@example.com"),
                ("FEED_PAGE_SIZE", "20"),
                ("FEED_RELAY_TIMEOUT_SECS", "2"),
                ("FEED_LOOKBACK_DAYS", "7"),
                ("FEED_SITE_TITLE", "Alice's notes"),
                ("FEED_LINK_BASE", "https://coracle.social/"),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.bind_addr, "127.0.0.1:9090");
                assert_eq!(config.pubkey.as_deref(), Some(pk.as_str()));
                assert_eq!(config.handle.as_deref(), Some("alice@example.com"));
                assert_eq!(config.page_size, 20);
                assert_eq!(config.relay_timeout, Duration::from_secs(2));
                assert_eq!(config.lookback, Duration::from_secs(7 * 86_400));
                assert_eq!(config.site_title, "Alice's notes");
                assert_eq!(config.link_base, "https://coracle.social");
            },
        );
    }

    #[test]
    fn config_relay_list_parsing() {
        with_env_vars(
            &[("FEED_RELAYS", " wss://a.example , ,wss://b.example,")],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(&*config.relays, &["wss://a.example", "wss://b.example"]);
            },
        );
    }

    #[test]
    fn config_blank_values_are_unset() {
        with_env_vars(&[("FEED_PUBKEY", "  "), ("FEED_HANDLE", "")], || {
            let config = Config::from_env().unwrap();
            assert!(config.pubkey.is_none());
            assert!(config.handle.is_none());
        });
    }

    #[test]
    fn config_rejects_bad_numbers() {
        with_env_vars(&[("FEED_PAGE_SIZE", "lots")], || {
            assert!(Config::from_env().is_err());
        });
        with_env_vars(&[("FEED_PAGE_SIZE", "0")], || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn config_rejects_overflowing_lookback() {
        with_env_vars(&[("FEED_LOOKBACK_DAYS", &u64::MAX.to_string())], || {
            let err = Config::from_env().unwrap_err();
            assert!(err.to_string().contains("FEED_LOOKBACK_DAYS"));
        });
    }

    #[test]
    fn config_rejects_invalid_fallback_key() {
        with_env_vars(&[("FEED_FALLBACK_PUBKEY", "tooshort")], || {
            assert!(Config::from_env().is_err());
        });
    }
}
