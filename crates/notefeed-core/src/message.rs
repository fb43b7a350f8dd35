//! Client and relay message framing over the `nostr` protocol types.
//!
//! Outgoing frames are [`ClientMessage`] `REQ` and `CLOSE`. Incoming frames
//! decode to [`RelayMessage`]; before decoding, an `EVENT` payload gets the
//! same `content`/`tags` defaults as [`crate::PostRecord::from_value`] and a
//! `CLOSED` frame without a reason gets an empty one.

use nostr::{ClientMessage, Filter, JsonUtil, RelayMessage, SubscriptionId};
use serde_json::Value;

use crate::error::Result;
use crate::event::with_defaults;

/// Encode a subscription request for a single filter.
pub fn client_req(subscription_id: &SubscriptionId, filter: &Filter) -> String {
    ClientMessage::req(subscription_id.clone(), filter.clone()).as_json()
}

/// Encode a subscription close.
pub fn client_close(subscription_id: &SubscriptionId) -> String {
    ClientMessage::close(subscription_id.clone()).as_json()
}

/// Decode one text frame from a relay.
///
/// Unknown message types and malformed frames are errors; callers log and
/// skip them.
pub fn decode_relay_message(text: &str) -> Result<RelayMessage<'static>> {
    let mut value: Value = serde_json::from_str(text)?;

    if let Value::Array(items) = &mut value {
        match items.first().and_then(Value::as_str) {
            Some("EVENT") if items.len() == 3 => {
                let event = std::mem::take(&mut items[2]);
                items[2] = with_defaults(event)?;
            }
            Some("CLOSED") if items.len() == 2 => items.push(Value::from("")),
            _ => {}
        }
    }

    Ok(RelayMessage::from_value(value)?)
}
