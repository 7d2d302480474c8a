//! The composition root.
//!
//! [`Blog`] owns the article store and the route registry. Handlers receive
//! it as `Arc<Blog>` on every call instead of reaching for globals, and use
//! it for storage and for reversing route names into URLs.

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::store::ArticleStore;
use crate::{articles, health, middleware, pages};

pub struct Blog {
    store: ArticleStore,
    router: Router<Blog>,
}

impl Blog {
    pub fn new(store: ArticleStore) -> Arc<Self> {
        Arc::new(Self { store, router: routes() })
    }

    pub fn store(&self) -> &ArticleStore { &self.store }

    /// The relative URL of route `name`, or an empty string when the name is
    /// unknown or `params` do not satisfy its placeholders.
    pub fn url(&self, name: &str, params: &[(&str, &str)]) -> String {
        self.router.url_for(name, params).unwrap_or_else(|| {
            debug!(route = name, "route reversal failed");
            String::new()
        })
    }

    /// Runs one request through the middleware and the registry.
    pub async fn handle(self: Arc<Self>, mut req: Request) -> Response {
        let started_at = Instant::now();
        middleware::strip_trailing_slash(&mut req.path);
        let method = req.method;
        let path = req.path.clone();

        let mut res = match self.router.dispatch(method, &path) {
            Some(matched) => {
                req.params = matched.params;
                matched.handler.call(req, Arc::clone(&self)).await
            }
            None => pages::not_found(),
        };

        middleware::force_html(&mut res);
        middleware::trace(method.as_str(), &path, res.status_code(), started_at.elapsed());
        res
    }
}

/// Answer for a request whose method the server does not recognise at all.
pub(crate) fn unroutable(method: &str, path: &str) -> Response {
    let started_at = Instant::now();
    let mut res = pages::not_found();
    middleware::force_html(&mut res);
    middleware::trace(method, path, res.status_code(), started_at.elapsed());
    res
}

/// The fixed route table. Registration order is dispatch order.
fn routes() -> Router<Blog> {
    Router::new()
        .on(Method::Get,  "/",                              "home",             pages::home)
        .on(Method::Get,  "/about",                         "about",            pages::about)
        .on(Method::Get,  "/healthz",                       "health.liveness",  health::liveness)
        .on(Method::Get,  "/readyz",                        "health.readiness", health::readiness)
        .on(Method::Get,  "/articles/{id:[0-9]+}",          "articles.show",    articles::show)
        .on(Method::Get,  "/articles",                      "articles.index",   articles::index)
        .on(Method::Post, "/articles",                      "articles.store",   articles::store)
        .on(Method::Get,  "/articles/create",               "articles.create",  articles::create)
        .on(Method::Get,  "/articles/{id:[0-9]+}/edit",     "articles.edit",    articles::edit)
        .on(Method::Post, "/articles/{id:[0-9]+}",          "articles.update",  articles::update)
        .on(Method::Post, "/articles/{id:[0-9]+}/delete",   "articles.delete",  articles::delete)
}
