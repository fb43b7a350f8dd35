//! Route definitions for the feed service.
//!
//! ## Routes
//!
//! - `GET /` - Feed page (`?page=N`)
//! - `GET /health` - Health check (JSON)
//! - `GET /robots.txt` - Crawler instructions

mod feed;
mod health;

use axum::Router;
use axum::response::IntoResponse;
use axum::routing::get;

use crate::state::AppState;

/// Build the complete feed service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(feed::feed_page))
        .route("/health", get(health::health_check))
        .route("/robots.txt", get(robots_txt))
        .with_state(state)
}

/// Serve robots.txt allowing all crawlers.
async fn robots_txt() -> impl IntoResponse {
    (
        [("content-type", "text/plain; charset=utf-8")],
        "User-agent: *\nAllow: /\n",
    )
}
