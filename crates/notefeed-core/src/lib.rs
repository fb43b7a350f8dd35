//! Core types and pure functions for the notefeed service.
//!
//! This crate provides:
//! - Validated decoding of relay-delivered records into [`PostRecord`]
//! - Client/relay message framing over the `nostr` protocol types
//! - Kind 0 profile metadata parsing and display fallbacks
//! - NIP-19 bech32 identifier decoding and encoding
//! - Reference extraction (reply parents, mentioned authors)
//!
//! Nothing in here performs I/O.

mod error;
mod event;
pub mod message;
pub mod nip19;
pub mod profile;
pub mod refs;

// ═══════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════

/// Length of a hex-encoded event id or public key.
pub const HEX_KEY_LEN: usize = 64;

/// Returns true if `s` is a 64-character hex string (either case).
pub fn is_hex_key(s: &str) -> bool {
    s.len() == HEX_KEY_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Shorten a long identifier for display: first 8 + `...` + last 4.
///
/// Strings of 16 characters or fewer are returned unchanged.
pub fn shorten(s: &str) -> String {
    if s.chars().count() <= 16 {
        return s.to_string();
    }
    let head: String = s.chars().take(8).collect();
    let tail: String = {
        let rev: Vec<char> = s.chars().rev().take(4).collect();
        rev.into_iter().rev().collect()
    };
    format!("{head}...{tail}")
}

pub use error::{Error, Result};
pub use event::PostRecord;
pub use profile::ProfileMetadata;
pub use refs::References;
