//! NIP-19 bech32 identifier codec.
//!
//! Thin wrapper over the `nostr` crate that speaks hex strings, which is
//! what every other part of the service uses for keys and ids. All
//! functions return `None` instead of an error: callers treat an
//! undecodable identifier as "not a reference".

use nostr::nips::nip19::{FromBech32, Nip19};
use nostr::{EventId, PublicKey, ToBech32};

/// Decode an `npub1…` or `nprofile1…` identifier to a hex public key.
pub fn decode_pubkey(bech32: &str) -> Option<String> {
    match Nip19::from_bech32(bech32).ok()? {
        Nip19::Pubkey(pk) => Some(pk.to_hex()),
        Nip19::Profile(profile) => Some(profile.public_key.to_hex()),
        _ => None,
    }
}

/// Decode a `note1…` or `nevent1…` identifier to a hex event id.
pub fn decode_event_id(bech32: &str) -> Option<String> {
    match Nip19::from_bech32(bech32).ok()? {
        Nip19::EventId(id) => Some(id.to_hex()),
        Nip19::Event(event) => Some(event.event_id.to_hex()),
        _ => None,
    }
}

/// Encode a hex public key as `npub1…`.
pub fn encode_npub(pubkey_hex: &str) -> Option<String> {
    PublicKey::from_hex(pubkey_hex).ok()?.to_bech32().ok()
}

/// Encode a hex event id as `note1…`.
pub fn encode_note(event_id_hex: &str) -> Option<String> {
    EventId::from_hex(event_id_hex).ok()?.to_bech32().ok()
}
