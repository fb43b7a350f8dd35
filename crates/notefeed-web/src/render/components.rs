//! Shared HTML components for the feed and error pages.
//!
//! These are maud functions that return `Markup` fragments for composition
//! into full pages.

use maud::{Markup, PreEscaped, html};

use crate::view::AuthorView;

/// Inline CSS for the feed page.
///
/// Single column, light and dark via `prefers-color-scheme`.
pub const PAGE_CSS: &str = r#"
*{margin:0;padding:0;box-sizing:border-box}
:root{--bg:#f9f9f9;--surface:#fff;--fg:#222;--meta:#888;--border:#eee;--link:#d93025;--parent-bg:#f5f5f5}
@media(prefers-color-scheme:dark){:root{--bg:#181a1b;--surface:#23272a;--fg:#f1f1f1;--meta:#b0b0b0;--border:#333a;--link:#f25c54;--parent-bg:#2c2f33}}
html,body{background:var(--bg);color:var(--fg);font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,Helvetica,Arial,sans-serif;line-height:1.5;min-height:100vh}
a{color:var(--link);text-decoration:none}
a:hover{opacity:.8}
img{max-width:100%;height:auto}
.container{max-width:680px;margin:0 auto;background:var(--surface);min-height:100vh}
@media(min-width:700px){.container{margin:2em auto;border-radius:12px;min-height:auto}}

header{padding:1.5em;border-bottom:1px solid var(--border)}
header h1{font-size:1.4rem;font-weight:700}
header h1 a{color:var(--fg)}

.post{padding:1.5em;border-bottom:1px solid var(--border);word-break:break-word}
.post:last-child{border-bottom:none}
.post-header{margin-bottom:.5em}
.user-info{display:flex;align-items:center;gap:.6em;margin-bottom:.5em}
.user-avatar{width:32px;height:32px;border-radius:50%;background:var(--border);object-fit:cover}
.user-name{font-weight:600;font-size:.95rem}
.post-content{font-size:1.05rem;margin-bottom:.75em;line-height:1.6}
.post-meta{font-size:.85rem;color:var(--meta);display:flex;gap:1em}
.post-meta a{color:inherit}

.parent-post{margin-bottom:1em;padding:1em;background:var(--parent-bg);border-radius:8px;border-left:3px solid var(--link)}
.parent-post .user-avatar{width:24px;height:24px}
.parent-post .user-name{font-size:.9rem}
.parent-content{opacity:.8;font-size:.95em}
.parent-link{font-size:.95em;margin-bottom:.5em}
.parent-link a{color:var(--meta);text-decoration:underline}

.post-image{display:block;max-height:480px;border-radius:8px;margin:.5em 0}
.post-video{display:block;width:100%;max-height:480px;border-radius:8px;margin:.5em 0;background:#000}
.youtube-embed{position:relative;padding-bottom:56.25%;height:0;margin:.5em 0;border-radius:8px;overflow:hidden}
.youtube-embed iframe{position:absolute;inset:0;width:100%;height:100%;border:0}

.no-posts{padding:3em 1.5em;text-align:center;color:var(--meta)}
.pagination{display:flex;justify-content:center;align-items:center;gap:1em;padding:1.5em;border-top:1px solid var(--border)}
footer{padding:2em;text-align:center;color:var(--meta);font-size:.85rem;border-top:1px solid var(--border)}
"#;

/// Inline CSS for error pages.
pub const ERROR_CSS: &str = r#"
*{margin:0;padding:0;box-sizing:border-box}
body{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;display:flex;justify-content:center;align-items:center;min-height:100vh;background:#f9f9f9;color:#222;padding:1rem}
.error-page{text-align:center;max-width:400px}
.error-page h1{font-size:1.5rem;margin-bottom:.75rem}
.error-page p{color:#666;margin-bottom:1rem;line-height:1.5}
@media(prefers-color-scheme:dark){
body{background:#181a1b;color:#f1f1f1}
.error-page p{color:#b0b0b0}
}
"#;

/// Content-Security-Policy header value.
///
/// Inline styles only, no scripts. Media from any HTTPS origin, frames
/// only from YouTube's embed host.
pub const CSP_HEADER: &str = "default-src 'none'; style-src 'unsafe-inline'; img-src https: data:; media-src https:; frame-src https://www.youtube.com; form-action 'none'; frame-ancestors 'none'";

/// Render the full HTML page shell with `<head>` and body content.
pub fn page_shell(title: &str, body_content: Markup) -> Markup {
    html! {
        (maud::DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                meta name="description" content=(title);
                style { (PreEscaped(PAGE_CSS)) }
            }
            body {
                div class="container" { (body_content) }
            }
        }
    }
}

/// Avatar and name for one author.
pub fn user_info(author: &AuthorView) -> Markup {
    html! {
        div class="user-info" {
            @if is_safe_url(&author.avatar_url) {
                img class="user-avatar" src=(author.avatar_url) alt=(author.label) loading="lazy";
            }
            span class="user-name" title=(author.npub) { (author.label) }
        }
    }
}

/// Format a timestamp as "Mon DD, YYYY HH:MM UTC" plus its ISO form.
/// Returns None if created_at is 0 (missing) or out of range.
pub fn format_timestamp(created_at: u64) -> Option<(String, String)> {
    if created_at == 0 {
        return None;
    }

    let ts = chrono::DateTime::from_timestamp(i64::try_from(created_at).ok()?, 0)?;
    let display = ts.format("%b %d, %Y %H:%M UTC").to_string();
    let iso = ts.format("%Y-%m-%dT%H:%M:%SZ").to_string();
    Some((display, iso))
}

/// Check if a URL is safe to use in `src` or `href` attributes.
pub fn is_safe_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_url_schemes() {
        assert!(is_safe_url("https://example.com"));
        assert!(is_safe_url("http://example.com"));
        assert!(!is_safe_url("javascript:alert(1)"));
        assert!(!is_safe_url("data:text/html,hi"));
        assert!(!is_safe_url(""));
    }

    #[test]
    fn timestamp_formatting() {
        let (display, iso) = format_timestamp(1_700_000_000).unwrap();
        assert_eq!(display, "Nov 14, 2023 22:13 UTC");
        assert_eq!(iso, "2023-11-14T22:13:20Z");
        assert!(format_timestamp(0).is_none());
        assert!(format_timestamp(u64::MAX).is_none());
    }

    #[test]
    fn csp_blocks_scripts_allows_youtube_frames() {
        assert!(!CSP_HEADER.contains("script-src"));
        assert!(CSP_HEADER.contains("default-src 'none'"));
        assert!(CSP_HEADER.contains("frame-src https://www.youtube.com"));
    }

    #[test]
    fn user_info_escapes_label() {
        let author = AuthorView {
            pubkey: "a".repeat(64),
            npub: "npub1x".to_string(),
            label: "<b>eve</b>".to_string(),
            avatar_url: "javascript:alert(1)".to_string(),
        };
        let html = user_info(&author).into_string();
        assert!(html.contains("&lt;b&gt;eve&lt;/b&gt;"));
        assert!(!html.contains("javascript:"));
    }
}
