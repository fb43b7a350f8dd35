//! Render-ready projection of one feed page.
//!
//! Pure: turns [`FeedData`] into display structs with every lookup miss
//! replaced by its fallback. Nothing here can fail.

use std::collections::HashMap;

use notefeed_core::profile::{avatar_url, display_label};
use notefeed_core::{PostRecord, ProfileMetadata, nip19, refs, shorten};

use crate::pipeline::FeedData;

/// Maximum length of a parent preview, in bytes.
pub const PARENT_PREVIEW_LEN: usize = 280;

/// One page of the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedView {
    /// The feed's own author.
    pub author: AuthorView,
    /// Posts on this page, newest first.
    pub posts: Vec<PostView>,
    /// Requested page, 1-indexed.
    pub page: u32,
    /// Number of pages; 0 when there are no posts at all.
    pub total_pages: u32,
    /// Display label for every author mentioned on this page.
    pub mention_labels: HashMap<String, String>,
}

impl FeedView {
    /// Page count as shown to readers; never less than 1.
    pub fn shown_total_pages(&self) -> u32 {
        self.total_pages.max(1)
    }

    /// Whether a "Prev" link is shown.
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Whether a "Next" link is shown.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// One primary post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostView {
    /// Event id (lowercase hex).
    pub id: String,
    /// `note1…` form of the id, for links.
    pub note_ref: String,
    /// Author with display fallbacks applied.
    pub author: AuthorView,
    /// Raw note text; rendering escapes it.
    pub content: String,
    /// Unix timestamp, 0 when the relay sent none.
    pub created_at: u64,
    /// Reply or quote target, if the note has one.
    pub parent: Option<ParentView>,
}

/// The post being replied to or quoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentView {
    /// The parent was fetched.
    Resolved {
        /// Parent event id (lowercase hex).
        id: String,
        /// `note1…` form of the id.
        note_ref: String,
        /// Parent author with display fallbacks applied.
        author: AuthorView,
        /// Content cut to [`PARENT_PREVIEW_LEN`].
        content: String,
    },
    /// The parent was asked for but no relay returned it.
    Unresolved {
        /// Requested parent id (lowercase hex).
        id: String,
        /// `note1…` form of the id, so the reader can look it up elsewhere.
        note_ref: String,
        /// First 8 + `...` + last 4 of the id.
        short_id: String,
    },
}

/// An author with every display field filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorView {
    /// Hex public key.
    pub pubkey: String,
    /// `npub1…` form, or the hex key if it cannot be encoded.
    pub npub: String,
    /// Profile name, display name, or shortened key.
    pub label: String,
    /// Profile picture or the generated robohash avatar.
    pub avatar_url: String,
}

impl AuthorView {
    fn new(pubkey: &str, profiles: &HashMap<String, ProfileMetadata>) -> Self {
        let profile = profiles.get(pubkey);
        Self {
            pubkey: pubkey.to_string(),
            npub: nip19::encode_npub(pubkey).unwrap_or_else(|| pubkey.to_string()),
            label: display_label(profile, pubkey),
            avatar_url: avatar_url(profile, pubkey),
        }
    }
}

fn note_ref(id: &str) -> String {
    nip19::encode_note(id).unwrap_or_else(|| id.to_string())
}

/// Cut `content` to at most `max_len` bytes, appending "..." if cut.
///
/// A URL or NIP-19 identifier that the cut would split is dropped whole.
fn preview(content: &str, max_len: usize) -> String {
    if content.len() <= max_len {
        return content.to_string();
    }

    let mut end = max_len;
    while !content.is_char_boundary(end) {
        end -= 1;
    }

    let token_start = content[..end]
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map_or(0, |(i, c)| i + c.len_utf8());
    let token_end = content[end..]
        .find(char::is_whitespace)
        .map_or(content.len(), |i| end + i);
    let token = &content[token_start..token_end];
    if token.contains("://") || refs::IDENTIFIER_REGEX.is_match(token) {
        end = token_start;
    }

    format!("{}...", content[..end].trim_end())
}

/// Project page `page` (1-indexed) of `data` with `page_size` posts per page.
pub fn project(data: &FeedData, page: u32, page_size: usize) -> FeedView {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let total_pages = data.main_ids.len().div_ceil(page_size) as u32;

    let start = (page as usize - 1).saturating_mul(page_size);
    let on_page: Vec<&PostRecord> = data
        .main_ids
        .iter()
        .skip(start)
        .take(page_size)
        .filter_map(|id| data.posts.get(id))
        .collect();

    let mut mention_labels = HashMap::new();
    let mut label_mentions = |record: &PostRecord| {
        for key in refs::mentioned_keys(record) {
            mention_labels
                .entry(key)
                .or_insert_with_key(|key| display_label(data.profiles.get(key), key));
        }
    };

    let mut posts = Vec::with_capacity(on_page.len());
    for record in on_page {
        label_mentions(record);

        let parent = refs::parent_id(record).map(|parent_id| match data.posts.get(&parent_id) {
            Some(parent) => {
                label_mentions(parent);
                ParentView::Resolved {
                    note_ref: note_ref(&parent_id),
                    author: AuthorView::new(&parent.pubkey, &data.profiles),
                    content: preview(&parent.content, PARENT_PREVIEW_LEN),
                    id: parent_id,
                }
            }
            None => ParentView::Unresolved {
                note_ref: note_ref(&parent_id),
                short_id: shorten(&parent_id),
                id: parent_id,
            },
        });

        posts.push(PostView {
            id: record.id.clone(),
            note_ref: note_ref(&record.id),
            author: AuthorView::new(&record.pubkey, &data.profiles),
            content: record.content.clone(),
            created_at: record.created_at,
            parent,
        });
    }

    FeedView {
        author: AuthorView::new(&data.author_key, &data.profiles),
        posts,
        page,
        total_pages,
        mention_labels,
    }
}
