//! Validated decoding of relay-delivered event objects.
//!
//! Relays send arbitrary JSON. Decoding goes through [`nostr::Event`], so
//! ids, keys, kinds and tags are checked by the protocol types, and
//! everything downstream works on the plain [`PostRecord`] projection.
//!
//! Relays occasionally omit `content` or `tags`; both are given explicit
//! empty defaults before decoding. Signatures are parsed but not verified.

use nostr::Event;
use serde_json::Value;

use crate::error::{Error, Result};

/// A decoded Nostr event as consumed by the aggregation pipeline.
///
/// Used for both text notes (kind 1) and profile metadata (kind 0); the
/// latter carries its profile JSON in `content`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    /// Event ID (lowercase hex).
    pub id: String,
    /// Author public key (lowercase hex).
    pub pubkey: String,
    /// Author-supplied unix timestamp.
    pub created_at: u64,
    /// Event kind number.
    pub kind: u16,
    /// Free-form content.
    pub content: String,
    /// Tags as nested string arrays, in declaration order.
    pub tags: Vec<Vec<String>>,
}

impl From<&Event> for PostRecord {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id.to_hex(),
            pubkey: event.pubkey.to_hex(),
            created_at: event.created_at.as_u64(),
            kind: event.kind.as_u16(),
            content: event.content.clone(),
            tags: event
                .tags
                .iter()
                .map(|tag| tag.as_slice().to_vec())
                .collect(),
        }
    }
}

impl PostRecord {
    /// Decode and validate an event object delivered in an `EVENT` frame.
    pub fn from_value(value: Value) -> Result<Self> {
        let event: Event = serde_json::from_value(with_defaults(value)?)?;
        Ok(Self::from(&event))
    }

    /// Convenience wrapper around [`PostRecord::from_value`] for raw JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }
}

/// Fill in `content` and `tags` when they are absent or `null`.
///
/// Everything else is left for [`nostr::Event`] to accept or reject.
pub fn with_defaults(mut value: Value) -> Result<Value> {
    let object = value.as_object_mut().ok_or(Error::NotAnObject)?;
    for (field, default) in [("content", Value::from("")), ("tags", Value::Array(Vec::new()))] {
        let slot = object.entry(field).or_insert(Value::Null);
        if slot.is_null() {
            *slot = default;
        }
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ID: &str = "4ff2236ceb2fdc6dee6317cd0b841f3f020ac985bb3f99f7f4c1f973ec28d06b";
    const PK: &str = "35e433c42e5bb838daabd178d54620e427cccb214c55b95daac3dbd9506fbcaf";

    fn sig() -> String {
        "7f".repeat(64)
    }

    #[test]
    fn decodes_complete_event() {
        let record = PostRecord::from_value(json!({
            "id": ID,
            "pubkey": PK,
            "created_at": 1_700_000_000u64,
            "kind": 1,
            "tags": [["e", "abc"], ["p", PK]],
            "content": "hello",
            "sig": sig()
        }))
        .unwrap();

        assert_eq!(record.id, ID);
        assert_eq!(record.pubkey, PK);
        assert_eq!(record.created_at, 1_700_000_000);
        assert_eq!(record.kind, 1);
        assert_eq!(record.content, "hello");
        assert_eq!(record.tags.len(), 2);
        assert_eq!(record.tags[0], vec!["e", "abc"]);
    }

    #[test]
    fn optional_fields_default_to_empty() {
        let record = PostRecord::from_value(json!({
            "id": ID,
            "pubkey": PK,
            "created_at": 5,
            "kind": 1,
            "sig": sig()
        }))
        .unwrap();
        assert!(record.content.is_empty());
        assert!(record.tags.is_empty());
    }

    #[test]
    fn null_content_and_tags_default_to_empty() {
        let record = PostRecord::from_value(json!({
            "id": ID,
            "pubkey": PK,
            "created_at": 5,
            "kind": 1,
            "content": null,
            "tags": null,
            "sig": sig()
        }))
        .unwrap();
        assert!(record.content.is_empty());
        assert!(record.tags.is_empty());
    }

    #[test]
    fn hex_fields_are_lowercased() {
        let record = PostRecord::from_value(json!({
            "id": ID.to_uppercase(),
            "pubkey": PK.to_uppercase(),
            "created_at": 5,
            "kind": 1,
            "sig": sig()
        }))
        .unwrap();
        assert_eq!(record.id, ID);
        assert_eq!(record.pubkey, PK);
    }

    #[test]
    fn matches_nostr_event_projection() {
        let json = json!({
            "id": ID,
            "pubkey": PK,
            "created_at": 42,
            "kind": 0,
            "tags": [],
            "content": "{\"name\":\"x\"}",
            "sig": sig()
        })
        .to_string();
        let event = <Event as nostr::JsonUtil>::from_json(&json).unwrap();
        assert_eq!(PostRecord::from(&event), PostRecord::from_json(&json).unwrap());
    }

    #[test]
    fn rejects_missing_id() {
        let err = PostRecord::from_value(json!({
            "pubkey": PK,
            "created_at": 5,
            "kind": 1,
            "sig": sig()
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn rejects_short_pubkey() {
        let err = PostRecord::from_value(json!({
            "id": ID,
            "pubkey": "abc",
            "created_at": 5,
            "kind": 1,
            "sig": sig()
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn rejects_missing_kind_and_timestamp() {
        let err = PostRecord::from_value(json!({ "id": ID, "pubkey": PK, "kind": 1, "sig": sig() }))
            .unwrap_err();
        assert!(matches!(err, Error::Json(_)));

        let err =
            PostRecord::from_value(json!({ "id": ID, "pubkey": PK, "created_at": 1, "sig": sig() }))
                .unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn rejects_non_string_tag_elements() {
        let err = PostRecord::from_value(json!({
            "id": ID,
            "pubkey": PK,
            "created_at": 5,
            "kind": 1,
            "tags": [["e", 42]],
            "sig": sig()
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn rejects_non_object() {
        assert!(matches!(
            PostRecord::from_value(json!("just a string")),
            Err(Error::NotAnObject)
        ));
        assert!(PostRecord::from_json("not json").is_err());
    }
}
