//! Error types for record and frame decoding.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding relay-delivered data.
#[derive(Error, Debug)]
pub enum Error {
    /// An event or frame was not the JSON shape the protocol requires.
    #[error("expected a JSON object")]
    NotAnObject,

    /// JSON parsing error, including fields rejected by the protocol types.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A relay frame that does not decode as a NIP-01 message.
    #[error("relay message error: {0}")]
    Message(#[from] nostr::message::MessageHandleError),
}
