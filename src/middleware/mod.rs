//! Middleware layer.
//!
//! Cross-cutting steps [`Blog::handle`](crate::Blog::handle) runs around
//! every handler:
//!
//! - [`strip_trailing_slash`] — before dispatch, so `/about/` finds `/about`
//! - [`force_html`] — after the handler, every answer is `text/html`
//! - [`trace`] — one log event per request with method, path, status, latency

use std::time::Duration;

use tracing::{error, info};

use crate::response::{self, Response};

/// Removes one trailing `/` from every path except the root.
pub fn strip_trailing_slash(path: &mut String) {
    if path.as_str() != "/" && path.ends_with('/') {
        path.pop();
    }
}

/// Forces `Content-Type: text/html; charset=utf-8`, replacing whatever the
/// handler set.
pub fn force_html(res: &mut Response) {
    res.set_header("content-type", response::HTML);
}

/// Emits the per-request access event. Server errors log at `error`.
pub fn trace(method: &str, path: &str, status: u16, elapsed: Duration) {
    let latency_us = elapsed.as_micros() as u64;
    if status >= 500 {
        error!(method, path, status, latency_us, "request failed");
    } else {
        info!(method, path, status, latency_us, "request");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stripped(path: &str) -> String {
        let mut path = path.to_owned();
        strip_trailing_slash(&mut path);
        path
    }

    #[test]
    fn strips_one_trailing_slash_except_root() {
        assert_eq!(stripped("/"), "/");
        assert_eq!(stripped("/about/"), "/about");
        assert_eq!(stripped("/articles/3/edit/"), "/articles/3/edit");
        assert_eq!(stripped("/articles"), "/articles");
        assert_eq!(stripped("/articles//"), "/articles/");
    }

    #[test]
    fn force_html_overrides_plain_text() {
        let mut res = Response::builder().header("Content-Type", "text/plain").no_body();
        force_html(&mut res);
        assert_eq!(res.header("content-type"), Some("text/html; charset=utf-8"));
    }

    #[test]
    fn force_html_adds_missing_header() {
        let mut res = Response::redirect("/articles");
        force_html(&mut res);
        assert_eq!(res.header("content-type"), Some("text/html; charset=utf-8"));
        assert_eq!(res.header("location"), Some("/articles"));
    }
}
