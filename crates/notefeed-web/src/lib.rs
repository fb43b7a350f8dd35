//! Notefeed - a paginated HTML feed of one author's Nostr notes.
//!
//! Every request resolves the author, queries a fixed list of relays and
//! renders the result. Nothing is stored between requests.
//!
//! # Architecture
//!
//! - **Identity**: literal hex key, or a NIP-05 handle looked up over HTTPS
//! - **Relay / Fetch**: one WebSocket query per relay, first non-empty wins
//! - **Pipeline**: primary posts, then reply parents, then profiles
//! - **View**: I/O-free projection of one page
//! - **Render**: HTML via maud (compile-time templates)
//!
//! # Security
//!
//! - All dynamic content is HTML-escaped by maud
//! - URLs are validated (HTTPS/HTTP only) before use in attributes
//! - Strict Content-Security-Policy: no JavaScript execution
//! - X-Frame-Options: DENY prevents clickjacking

pub mod config;
pub mod error;
pub mod fetch;
pub mod identity;
pub mod pipeline;
pub mod relay;
pub mod render;
pub mod routes;
pub mod state;
pub mod view;

pub use config::Config;
pub use error::FeedError;
pub use routes::router;
pub use state::AppState;
