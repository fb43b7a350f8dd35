//! Feed page renderer.
//!
//! One page of posts, each with an optional parent block, followed by
//! pagination and a footer linking back to the author.

use std::collections::HashMap;

use maud::{Markup, html};

use super::components::{format_timestamp, page_shell, user_info};
use super::content::render_content;
use crate::view::{FeedView, ParentView, PostView};

/// Site-wide values the page needs besides the feed itself.
#[derive(Debug, Clone, Copy)]
pub struct SiteInfo<'a> {
    /// Heading and `<title>`.
    pub title: &'a str,
    /// Base URL for note and profile links.
    pub link_base: &'a str,
    /// NIP-05 handle shown in the footer, if configured.
    pub handle: Option<&'a str>,
}

/// Render a complete feed page.
pub fn render_feed(view: &FeedView, site: SiteInfo<'_>) -> Markup {
    let body = html! {
        header {
            h1 { a href="/" { (site.title) } }
        }

        @if view.posts.is_empty() {
            div class="no-posts" { "No posts found." }
        } @else {
            @for post in &view.posts {
                (render_post(post, &view.mention_labels, site.link_base))
            }
        }

        nav class="pagination" {
            @if view.has_prev() {
                a href={"?page=" (view.page - 1)} { "« Prev" }
            }
            span { "Page " (view.page) " of " (view.shown_total_pages()) }
            @if view.has_next() {
                a href={"?page=" (view.page + 1)} { "Next »" }
            }
        }

        footer {
            p {
                "Follow me: "
                a href={(site.link_base) "/" (view.author.npub)} target="_blank" rel="noopener" {
                    (site.handle.unwrap_or(&view.author.label))
                }
            }
        }
    };

    page_shell(site.title, body)
}

fn render_post(post: &PostView, mention_labels: &HashMap<String, String>, link_base: &str) -> Markup {
    let timestamp = format_timestamp(post.created_at);

    html! {
        article class="post" {
            @if let Some(parent) = &post.parent {
                (render_parent(parent, mention_labels, link_base))
            }
            div class="post-header" {
                (user_info(&post.author))
            }
            div class="post-content" {
                (render_content(&post.content, mention_labels, link_base))
            }
            div class="post-meta" {
                @if let Some((display, iso)) = &timestamp {
                    time datetime=(iso) { (display) }
                }
                a href={(link_base) "/" (post.note_ref)} target="_blank" rel="noopener" { "share" }
            }
        }
    }
}

fn render_parent(
    parent: &ParentView,
    mention_labels: &HashMap<String, String>,
    link_base: &str,
) -> Markup {
    match parent {
        ParentView::Resolved {
            note_ref,
            author,
            content,
            ..
        } => html! {
            div class="parent-post" {
                (user_info(author))
                div class="post-content parent-content" {
                    (render_content(content, mention_labels, link_base))
                }
                div class="post-meta" {
                    a href={(link_base) "/" (note_ref)} target="_blank" rel="noopener" { "view original" }
                }
            }
        },
        ParentView::Unresolved {
            note_ref, short_id, ..
        } => html! {
            div class="parent-link" {
                a href={(link_base) "/" (note_ref)} target="_blank" rel="noopener" {
                    "Replying to event: " (short_id)
                }
            }
        },
    }
}
