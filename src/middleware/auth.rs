//! # Authentication Middleware
//!
//! Validates the bearer token issued by the authentication collaborator and
//! hands the resulting [`Principal`] to protected routes. Authorization is a
//! separate step: handlers call [`require_role`] before touching state.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, trace, warn};

use crate::error::{AppError, AppResult};
use crate::models::{AppState, Principal, Role};

/// Authentication middleware for protecting routes
///
/// # Authentication Flow
///
/// 1. Extracts `Authorization` header with `Bearer <token>` format
/// 2. Validates the JWT token signature and expiration
/// 3. Builds a [`Principal`] from the claims
/// 4. Adds it to request extensions for handler access
///
/// # Returns
///
/// - **Success**: Continues to next handler with the principal
/// - **Failure**: `401 Unauthorized` for missing, malformed or expired tokens
#[instrument(
    skip_all,
    fields(
        method = %req.method(),
        uri = %req.uri(),
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    trace!("Processing authentication middleware");

    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok());

    let Some(auth_header) = auth_header else {
        warn!("Missing Authorization header");
        return Err(AppError::Unauthorized("Missing bearer token"));
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        warn!("Invalid Authorization header format");
        return Err(AppError::Unauthorized("Invalid Authorization header"));
    };

    let principal = state
        .jwt_service
        .validate_access_token(token)
        .and_then(Principal::try_from)
        .map_err(|e| {
            warn!(error = %e, "Token validation failed");
            AppError::Unauthorized("Invalid or expired token")
        })?;

    debug!(user_id = %principal.user_id, role = %principal.role, "Authentication successful");
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

/// The single capability check used by every mutating operation.
///
/// `ADMIN` satisfies any requirement; other roles must match exactly.
pub fn require_role(principal: &Principal, role: Role) -> AppResult<()> {
    if principal.role == role || principal.role == Role::Admin {
        return Ok(());
    }

    warn!(
        user_id = %principal.user_id,
        actual = %principal.role,
        required = %role,
        "Role check failed"
    );
    Err(AppError::Forbidden("Insufficient role for this operation"))
}
