//! Health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the database answer? Failure → pulled from load-balancer. |

use std::sync::Arc;

use tracing::warn;

use crate::{Blog, Request, Response, Status};

/// Always `200 OK` with body `"ok"`. No dependencies: if the process can
/// answer HTTP at all, it is alive.
pub async fn liveness(_req: Request, _blog: Arc<Blog>) -> Response {
    Response::html("ok")
}

/// `200 OK` with `"ready"` when a pooled connection answers `SELECT 1`,
/// `503` otherwise.
pub async fn readiness(_req: Request, blog: Arc<Blog>) -> Response {
    match blog.store().ping().await {
        Ok(()) => Response::html("ready"),
        Err(e) => {
            warn!(error = %e, "readiness check failed");
            Response::builder()
                .status(Status::ServiceUnavailable)
                .html("not ready")
        }
    }
}
