//! Feed page handler.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::error::FeedError;
use crate::render::components::CSP_HEADER;
use crate::render::{SiteInfo, render_feed};
use crate::state::AppState;
use crate::view;

/// Browser and CDN cache lifetime for the feed page.
const CACHE_CONTROL: &str = "public, max-age=60";

/// `GET /?page=N`
///
/// A missing, zero, negative or non-numeric page is page 1. Dropping the
/// request drops this future, which closes any open relay sockets.
pub async fn feed_page(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, FeedError> {
    let page = parse_page(params.get("page").map(String::as_str));
    let now = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0);

    let data = state.pipeline().run(page, now).await?;

    let config = &state.config;
    let feed = view::project(&data, page, config.page_size);
    let html = render_feed(
        &feed,
        SiteInfo {
            title: &config.site_title,
            link_base: &config.link_base,
            handle: config.handle.as_deref(),
        },
    )
    .into_string();

    Ok(build_response(&html))
}

/// Parse the `page` query parameter, defaulting to 1.
fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|&page| page > 0)
        .unwrap_or(1)
}

/// Build an HTML response with security, ETag and cache headers.
fn build_response(html: &str) -> Response {
    let mut headers = HeaderMap::new();

    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL));

    // Security headers
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CSP_HEADER),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));

    // ETag (xxHash of content)
    let hash = xxhash_rust::xxh3::xxh3_64(html.as_bytes());
    let etag = format!("\"{}\"", hex_fmt::HexFmt(&hash.to_be_bytes()));
    if let Ok(val) = HeaderValue::from_str(&etag) {
        headers.insert(header::ETAG, val);
    }

    (StatusCode::OK, headers, html.to_string()).into_response()
}
