//! HTML rendering for the feed.
//!
//! All rendering uses [maud](https://maud.lambda.xyz/) for compile-time HTML
//! generation with automatic XSS protection (all dynamic values are escaped).

pub mod components;
pub mod content;
pub mod feed;

pub use feed::{SiteInfo, render_feed};
