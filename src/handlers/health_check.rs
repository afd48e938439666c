//! # Health Check Handler
//!
//! Liveness check for load balancers and orchestrators. Mounted outside the
//! auth layer and never touches the store, so a slow database does not turn
//! the instance unhealthy.

use axum::http::StatusCode;
use tracing::trace;

/// GET /health-check
///
/// Always `200 OK` with an empty body.
pub async fn health_check() -> StatusCode {
    trace!("Health check");
    StatusCode::OK
}
