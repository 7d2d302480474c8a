//! # leaflet
//!
//! A small server-rendered blog. Visitors read a home page, an about page and
//! a list of short articles; an author writes, edits and deletes articles
//! through plain HTML forms.
//!
//! ## Pieces
//!
//! - [`store::ArticleStore`] — the `articles` table on a pooled SQLite file
//! - [`validate::validate`] — title/body rules, one message per bad field
//! - [`Router`] — named routes: first-match dispatch and name → URL reversal
//! - [`articles`] — one handler per lifecycle step
//! - [`Blog`] — owns the store and the registry; every handler receives it
//! - [`Server`] — hyper, graceful shutdown on SIGTERM / Ctrl-C
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use leaflet::{Blog, Server, config::DatabaseConfig, store::ArticleStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), leaflet::Error> {
//!     let store = ArticleStore::connect(&DatabaseConfig::at("blog.db")).await?;
//!     Server::bind(([127, 0, 0, 1], 3000).into())
//!         .serve(Blog::new(store))
//!         .await
//! }
//! ```
//!
//! Handlers can be exercised without a socket:
//!
//! ```rust,no_run
//! # use leaflet::{Blog, Method, Request};
//! # async fn run(blog: std::sync::Arc<Blog>) {
//! let res = blog.handle(Request::new(Method::Get, "/articles/999999")).await;
//! assert_eq!(res.status_code(), 404);
//! # }
//! ```

mod blog;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod articles;
pub mod config;
pub mod health;
pub mod middleware;
pub mod pages;
pub mod store;
pub mod validate;
pub mod views;

pub use blog::Blog;
pub use error::{Error, StoreError, StoreResult};
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::{RouteMatch, Router};
pub use server::Server;
pub use status::Status;
