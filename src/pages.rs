//! Static pages.

use std::sync::Arc;

use crate::{Blog, Request, Response, Status, views};

pub async fn home(_req: Request, _blog: Arc<Blog>) -> Response {
    Response::html(views::home())
}

pub async fn about(_req: Request, _blog: Arc<Blog>) -> Response {
    Response::html(views::about())
}

/// Answer for any request the registry cannot route.
pub fn not_found() -> Response {
    Response::builder()
        .status(Status::NotFound)
        .html(views::message(
            "Page not found :(",
            "If this looks wrong, please get in touch.",
        ))
}
