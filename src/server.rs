//! HTTP server and graceful shutdown.
//!
//! On SIGTERM or Ctrl-C the server:
//! 1. Immediately stops `listener.accept()` — no new connections are made.
//! 2. Lets every in-flight connection task run to completion.
//! 3. Returns from [`Server::serve`], which lets `main` exit cleanly.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Incoming};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::blog::{self, Blog};
use crate::error::Error;
use crate::method::Method;
use crate::middleware;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// Largest request body the server reads, in bytes. Form posts are tiny;
/// anything bigger is refused before it is buffered.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    pub fn bind(addr: SocketAddr) -> Self {
        Self { addr }
    }

    /// Starts accepting connections and dispatching them through `blog`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve(self, blog: Arc<Blog>) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;

        info!(addr = %self.addr, "leaflet listening");

        // Every spawned connection task, so shutdown can wait for them.
        let mut tasks = tokio::task::JoinSet::new();

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Check shutdown first so a SIGTERM stops accepting at once,
                // even if more connections are queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let blog = Arc::clone(&blog);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req| {
                            let blog = Arc::clone(&blog);
                            async move { dispatch(blog, req).await }
                        });

                        // HTTP/1.1 or HTTP/2, whatever the client negotiates.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the set stays bounded.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("leaflet stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Reads one hyper request into a [`Request`] and lets the blog answer it.
///
/// Every failure becomes a response, so hyper never sees an error.
async fn dispatch(
    blog: Arc<Blog>,
    req: hyper::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let path = parts.uri.path().to_owned();

    let Ok(method) = Method::try_from(&parts.method) else {
        return Ok(blog::unroutable(parts.method.as_str(), &path).into_inner());
    };

    let body = match read_body(body, &path).await {
        Ok(body) => body,
        Err(res) => return Ok(res.into_inner()),
    };

    let mut request = Request::new(method, path).with_body(body.to_vec());
    request.headers = parts.headers.iter()
        .filter_map(|(name, value)| Some((name.as_str().to_owned(), value.to_str().ok()?.to_owned())))
        .collect();

    Ok(blog.handle(request).await.into_inner())
}

/// Collects at most [`MAX_BODY_BYTES`] of `body`.
///
/// An oversized body answers 413, an unreadable one 400.
async fn read_body<B>(body: B, path: &str) -> Result<Bytes, Response>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let status = match Limited::new(body, MAX_BODY_BYTES).collect().await {
        Ok(collected) => return Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => {
            warn!(path, limit = MAX_BODY_BYTES, "request body too large");
            Status::PayloadTooLarge
        }
        Err(e) => {
            warn!(path, "failed to read request body: {e}");
            Status::BadRequest
        }
    };
    let mut res = Response::status(status);
    middleware::force_html(&mut res);
    Err(res)
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or SIGINT (Ctrl-C). On non-Unix platforms
/// only Ctrl-C is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c  => {}
        () = sigterm => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn small_body_is_read_whole() {
        let body = Full::new(Bytes::from_static(b"title=Hi&body=hello"));
        let Ok(bytes) = read_body(body, "/articles").await else {
            panic!("small body rejected");
        };
        assert_eq!(&bytes[..], b"title=Hi&body=hello");
    }

    #[tokio::test]
    async fn body_at_limit_is_accepted() {
        let body = Full::new(Bytes::from(vec![b'a'; MAX_BODY_BYTES]));
        assert!(read_body(body, "/articles").await.is_ok());
    }

    #[tokio::test]
    async fn oversized_body_is_413_html() {
        let body = Full::new(Bytes::from(vec![b'a'; MAX_BODY_BYTES + 1]));
        let Err(res) = read_body(body, "/articles").await else {
            panic!("oversized body accepted");
        };
        assert_eq!(res.status_code(), 413);
        assert_eq!(res.header("content-type"), Some("text/html; charset=utf-8"));
    }
}
