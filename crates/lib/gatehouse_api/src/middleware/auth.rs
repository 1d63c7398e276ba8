//! Authentication middleware: Bearer token extraction and JWT verification.

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use gatehouse_core::auth::issuer::subject;
use gatehouse_core::models::auth::TokenClaims;
use gatehouse_core::permissions::PERMISSION_ADMIN;
use uuid::Uuid;

use crate::AppState;
use crate::error::{AUTHENTICATION_FAILED, AppError, AppResult};

/// Key used to store `TokenClaims` in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub TokenClaims);

impl AuthenticatedUser {
    /// The principal's user id.
    pub fn user_id(&self) -> AppResult<Uuid> {
        subject(&self.0.sub).map_err(AppError::from)
    }
}

/// Axum middleware: extracts `Authorization: Bearer <token>`, verifies the JWT,
/// and injects `AuthenticatedUser` into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization scheme".into()))?;

    let claims = state
        .service
        .verify_access(token)
        .map_err(|_| AppError::Unauthorized(AUTHENTICATION_FAILED.into()))?;

    request.extensions_mut().insert(AuthenticatedUser(claims));

    Ok(next.run(request).await)
}

/// Axum middleware: requires `admin:*` on an already authenticated request.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    let allowed = request
        .extensions()
        .get::<AuthenticatedUser>()
        .is_some_and(|user| user.0.has_permission(PERMISSION_ADMIN));
    if !allowed {
        return Err(AppError::Forbidden("admin permission required".into()));
    }
    Ok(next.run(request).await)
}
