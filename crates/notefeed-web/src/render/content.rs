//! Content parsing and rendering for note text.
//!
//! Handles:
//! - URL detection and linking
//! - YouTube, image and video URLs rendered as embeds
//! - NIP-19 identifiers (with or without `nostr:`) linked to the link base
//! - Newline preservation
//! - HTML escaping (handled by maud automatically)

use std::collections::HashMap;
use std::sync::LazyLock;

use maud::{Markup, html};
use notefeed_core::refs::IDENTIFIER_REGEX;
use notefeed_core::{nip19, shorten};
use regex::Regex;

use super::components::is_safe_url;

/// Regex for matching URLs in text content.
static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s<>\)\]]+").expect("URL regex should compile"));

/// YouTube watch and short links. Group 1 is the video id.
static YOUTUBE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.)?(?:youtube\.com/watch\?v=|youtu\.be/)([A-Za-z0-9_-]{11})")
        .expect("YouTube regex should compile")
});

/// Image file extensions for inline rendering.
const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp"];

/// Video file extensions for inline rendering.
const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".webm", ".ogg"];

/// A segment of parsed content.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ContentSegment {
    /// Plain text (to be HTML-escaped).
    Text(String),
    /// A URL to be linked or embedded.
    Url(String),
    /// A NIP-19 identifier, without any `nostr:` prefix.
    Identifier(String),
}

/// Render note content as HTML.
///
/// `mention_labels` maps hex pubkeys to display labels for `npub`/`nprofile`
/// mentions. `link_base` is prepended to every identifier link.
pub fn render_content(
    text: &str,
    mention_labels: &HashMap<String, String>,
    link_base: &str,
) -> Markup {
    let segments = parse_content_segments(text);

    html! {
        @for segment in &segments {
            @match segment {
                ContentSegment::Text(text) => (render_text(text)),
                ContentSegment::Url(url) => (render_url(url)),
                ContentSegment::Identifier(bech32) => {
                    (render_identifier(bech32, mention_labels, link_base))
                }
            }
        }
    }
}

/// Plain text with newlines as `<br>`.
fn render_text(text: &str) -> Markup {
    html! {
        @for (i, line) in text.split('\n').enumerate() {
            @if i > 0 { br; }
            (line)
        }
    }
}

fn render_url(url: &str) -> Markup {
    if let Some(video_id) = YOUTUBE_REGEX.captures(url).and_then(|c| c.get(1)) {
        return html! {
            div class="youtube-embed" {
                iframe src={"https://www.youtube.com/embed/" (video_id.as_str())}
                    title="YouTube video" loading="lazy" allowfullscreen {}
            }
        };
    }

    if has_extension(url, VIDEO_EXTENSIONS) {
        return html! {
            video class="post-video" src=(url) controls preload="metadata" {
                a href=(url) target="_blank" rel="noopener" { (url) }
            }
        };
    }

    if has_extension(url, IMAGE_EXTENSIONS) {
        return html! {
            a href=(url) target="_blank" rel="noopener" {
                img class="post-image" src=(url) alt="" loading="lazy";
            }
        };
    }

    html! {
        a href=(url) target="_blank" rel="noopener" { (url) }
    }
}

/// Link an identifier to the link base, labelled by its kind.
fn render_identifier(
    bech32: &str,
    mention_labels: &HashMap<String, String>,
    link_base: &str,
) -> Markup {
    let short = shorten(bech32);
    let label = if bech32.starts_with("npub1") || bech32.starts_with("nprofile1") {
        let name = nip19::decode_pubkey(bech32)
            .and_then(|hex| mention_labels.get(&hex).cloned())
            .unwrap_or(short);
        format!("@{name}")
    } else if bech32.starts_with("note1") || bech32.starts_with("nevent1") {
        format!("[event:{short}]")
    } else {
        format!("[nostr:{short}]")
    };

    html! {
        a href={(link_base) "/" (bech32)} target="_blank" rel="noopener" { (label) }
    }
}

/// Parse content text into segments of plain text, URLs, and identifiers.
fn parse_content_segments(text: &str) -> Vec<ContentSegment> {
    let mut segments = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        // Earliest of a URL or an identifier; ties go to the URL.
        let url = URL_REGEX.find(remaining).map(|m| (m.start(), m.end()));
        let identifier = IDENTIFIER_REGEX.captures(remaining).and_then(|caps| {
            let whole = caps.get(0)?;
            let bare = caps.get(1)?;
            Some((whole.start(), whole.end(), bare.as_str().to_string()))
        });

        let (start, end, segment) = match (url, identifier) {
            (Some((us, ue)), Some((is, _, _))) if us <= is => {
                (us, ue, ContentSegment::Url(remaining[us..ue].to_string()))
            }
            (_, Some((is, ie, bare))) => (is, ie, ContentSegment::Identifier(bare)),
            (Some((us, ue)), None) => (us, ue, ContentSegment::Url(remaining[us..ue].to_string())),
            (None, None) => {
                segments.push(ContentSegment::Text(remaining.to_string()));
                break;
            }
        };

        if start > 0 {
            segments.push(ContentSegment::Text(remaining[..start].to_string()));
        }
        segments.push(segment);
        remaining = &remaining[end..];
    }

    segments
}

/// Check the URL path (query stripped) against a list of extensions.
fn has_extension(url: &str, extensions: &[&str]) -> bool {
    if !is_safe_url(url) {
        return false;
    }
    let lower = url.to_lowercase();
    let path = lower.split(['?', '#']).next().unwrap_or(&lower);
    extensions.iter().any(|ext| path.ends_with(ext))
}
