//! Reference extraction: reply parents and mentioned authors.
//!
//! Pure functions over a [`PostRecord`]. Running them twice on the same
//! record gives the same answer.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::event::PostRecord;
use crate::{is_hex_key, nip19};

/// Matches bech32 NIP-19 identifiers, optionally behind a `nostr:` scheme.
/// Capture group 1 is the bare identifier.
pub static IDENTIFIER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:nostr:)?((?:npub|note|nevent|nprofile|naddr|nrelay)1[0-9a-z]{20,})\b")
        .expect("identifier regex should compile")
});

/// References discovered in one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct References {
    /// Thread-edge target, if any.
    pub parent: Option<String>,
    /// Hex keys of authors mentioned in the content.
    pub mentions: BTreeSet<String>,
}

/// Extract both the parent id and the mentioned authors.
pub fn extract(record: &PostRecord) -> References {
    References {
        parent: parent_id(record),
        mentions: mentioned_keys(record),
    }
}

/// The reply/quote parent of a record, as lowercase hex.
///
/// This is the *last* `e` tag whose target is a 64-character hex id other
/// than the record's own. Earlier `e` tags (thread roots, other quotes) are
/// ignored, as are targets that are not event ids at all.
pub fn parent_id(record: &PostRecord) -> Option<String> {
    record
        .tags
        .iter()
        .filter(|tag| tag.len() >= 2 && tag[0] == "e")
        .map(|tag| tag[1].to_ascii_lowercase())
        .filter(|target| is_hex_key(target) && *target != record.id)
        .next_back()
}

/// Hex keys of every `npub`/`nprofile` identifier in the record content.
///
/// Other identifier kinds and identifiers that fail to decode are skipped.
pub fn mentioned_keys(record: &PostRecord) -> BTreeSet<String> {
    mentioned_keys_in(&record.content)
}

/// Same as [`mentioned_keys`] for free text.
pub fn mentioned_keys_in(text: &str) -> BTreeSet<String> {
    IDENTIFIER_REGEX
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|bech32| bech32.starts_with("npub1") || bech32.starts_with("nprofile1"))
        .filter_map(nip19::decode_pubkey)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SELF_ID: &str = "1111111111111111111111111111111111111111111111111111111111111111";
    const A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    const NPUB: &str = "npub10elfcs4fr0l0r8af98jlmgdh9c8tcxjvz9qkw038js35mp4dma8qzvjptg";
    const NPUB_HEX: &str = "7e7e9c42a91bfef19fa929e5fda1b72e0ebc1a4c1141673e2794234d86addf4e";
    const NPROFILE: &str = "nprofile1qqsrhuxx8l9ex335q7he0f09aej04zpazpl0ne2cgukyawd24mayt8gpp4mhxue69uhhytnc9e3k7mgpz4mhxue69uhkg6nzv9ejuumpv34kytnrdaksjlyr9p";
    const NPROFILE_HEX: &str = "3bf0c63fcb93463407af97a5e5ee64fa883d107ef9e558472c4eb9aaaefa459d";

    fn record(content: &str, tags: Vec<Vec<&str>>) -> PostRecord {
        PostRecord {
            id: SELF_ID.to_string(),
            pubkey: A.to_string(),
            created_at: 100,
            kind: 1,
            content: content.to_string(),
            tags: tags
                .into_iter()
                .map(|t| t.into_iter().map(str::to_string).collect())
                .collect(),
        }
    }

    #[test]
    fn no_tags_no_parent() {
        assert_eq!(parent_id(&record("", vec![])), None);
    }

    #[test]
    fn single_e_tag_is_parent() {
        let r = record("", vec![vec!["e", A]]);
        assert_eq!(parent_id(&r).as_deref(), Some(A));
    }

    #[test]
    fn last_e_tag_wins() {
        let r = record(
            "",
            vec![vec!["e", A, "", "root"], vec!["p", B], vec!["e", B, "", "reply"]],
        );
        assert_eq!(parent_id(&r).as_deref(), Some(B));
    }

    #[test]
    fn last_e_tag_wins_even_when_marked_root() {
        let r = record("", vec![vec!["e", B, "", "reply"], vec!["e", A, "", "root"]]);
        assert_eq!(parent_id(&r).as_deref(), Some(A));
    }

    #[test]
    fn self_reference_skipped() {
        let r = record("", vec![vec!["e", A], vec!["e", SELF_ID]]);
        assert_eq!(parent_id(&r).as_deref(), Some(A));

        let only_self = record("", vec![vec!["e", SELF_ID]]);
        assert_eq!(parent_id(&only_self), None);
    }

    #[test]
    fn non_hex_e_tags_skipped() {
        let r = record("", vec![vec!["e", A], vec!["e", "not-a-hex-id"]]);
        assert_eq!(parent_id(&r).as_deref(), Some(A));

        let short = record("", vec![vec!["e", "abcd"]]);
        assert_eq!(parent_id(&short), None);
    }

    #[test]
    fn parent_is_lowercased() {
        let r = record("", vec![vec!["e", &B.to_uppercase()]]);
        assert_eq!(parent_id(&r).as_deref(), Some(B));

        let mut upper_self = record("", vec![vec!["e", &A.to_uppercase()]]);
        upper_self.id = A.to_string();
        assert_eq!(parent_id(&upper_self), None);
    }

    #[test]
    fn empty_and_truncated_e_tags_skipped() {
        let r = record("", vec![vec!["e", A], vec!["e", ""], vec!["e"]]);
        assert_eq!(parent_id(&r).as_deref(), Some(A));
    }

    #[test]
    fn p_and_q_tags_are_not_parents() {
        let r = record("", vec![vec!["p", A], vec!["q", B]]);
        assert_eq!(parent_id(&r), None);
    }

    #[test]
    fn mentions_npub_and_nprofile() {
        let text = format!("hi nostr:{NPUB} and {NPROFILE}!");
        let mentions = mentioned_keys(&record(&text, vec![]));
        let expected: BTreeSet<String> = [NPUB_HEX, NPROFILE_HEX]
            .into_iter()
            .map(str::to_string)
            .collect();
        assert_eq!(mentions, expected);
    }

    #[test]
    fn duplicate_mentions_collapse() {
        let text = format!("{NPUB} {NPUB} nostr:{NPUB}");
        assert_eq!(mentioned_keys_in(&text).len(), 1);
    }

    #[test]
    fn note_identifiers_are_not_mentions() {
        let note = nip19::encode_note(A).unwrap();
        assert!(mentioned_keys_in(&format!("see nostr:{note}")).is_empty());
    }

    #[test]
    fn undecodable_identifier_skipped_rest_kept() {
        let text = format!("npub1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqq broken, {NPUB} fine");
        let mentions = mentioned_keys_in(&text);
        assert_eq!(mentions.len(), 1);
        assert!(mentions.contains(NPUB_HEX));
    }

    #[test]
    fn short_identifier_not_matched() {
        assert!(IDENTIFIER_REGEX.find("npub1abc").is_none());
    }

    #[test]
    fn extraction_is_idempotent() {
        let text = format!("reply to nostr:{NPUB}");
        let r = record(&text, vec![vec!["e", A], vec!["e", B]]);
        let first = extract(&r);
        let second = extract(&r);
        assert_eq!(first, second);
        assert_eq!(first.parent.as_deref(), Some(B));
        assert!(first.mentions.contains(NPUB_HEX));
    }
}
