//! Error types for the feed service.
//!
//! Errors are rendered as simple HTML pages rather than JSON, since the
//! feed is a user-facing HTML page.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use maud::{DOCTYPE, html};

/// Feed service error type.
///
/// Relay and directory failures never show up here: they degrade to fewer
/// results. The only user-visible failure is an author that cannot be
/// determined.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// No author key could be determined from the configuration.
    #[error("could not resolve pubkey for handle")]
    IdentityUnresolved,

    /// Internal server error (rendering, runtime, etc.).
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for FeedError {
    fn into_response(self) -> Response {
        let (status, title, message) = match &self {
            Self::IdentityUnresolved => (
                StatusCode::NOT_FOUND,
                "Not Found",
                "Could not resolve pubkey for handle.",
            ),
            Self::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Error",
                    "An internal error occurred. Please try again later.",
                )
            }
        };

        let markup = html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    meta name="viewport" content="width=device-width, initial-scale=1";
                    title { (title) }
                    meta name="robots" content="noindex";
                    style { (maud::PreEscaped(crate::render::components::ERROR_CSS)) }
                }
                body {
                    main class="error-page" {
                        h1 { (title) }
                        p { (message) }
                    }
                }
            }
        };

        (status, markup).into_response()
    }
}
