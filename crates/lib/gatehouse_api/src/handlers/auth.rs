//! Authentication request handlers.

use axum::extract::State;
use axum::{Extension, Json};
use gatehouse_core::LogoutScope;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    LoginRequest, LogoutRequest, LogoutResponse, PermissionsResponse, RefreshRequest,
    RegisterRequest, TokenResponse,
};

/// `POST /auth/register`: create a password account.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<Json<TokenResponse>> {
    let pair = state
        .service
        .register(&body.email, &body.password, body.name.as_deref())
        .await?;
    Ok(Json(pair.into()))
}

/// `POST /auth/login`: authenticate with email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let pair = state.service.login(&body.email, &body.password).await?;
    Ok(Json(pair.into()))
}

/// `POST /auth/refresh`: exchange a refresh token for a new token pair.
pub async fn refresh_handler(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> AppResult<Json<TokenResponse>> {
    let pair = state.service.refresh(&body.refresh_token).await?;
    Ok(Json(pair.into()))
}

/// `POST /auth/logout`: revoke one refresh token, or all of them.
pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<LogoutRequest>,
) -> AppResult<Json<LogoutResponse>> {
    let scope = match (body.all, body.refresh_token) {
        (true, _) => LogoutScope::All,
        (false, Some(token)) => LogoutScope::Token(token),
        (false, None) => {
            return Err(AppError::Validation(
                "refreshToken or all=true is required".into(),
            ));
        }
    };
    state.service.logout(user.user_id()?, scope).await?;
    Ok(Json(LogoutResponse { success: true }))
}

/// `GET /auth/permissions`: permissions of the calling user.
pub async fn permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<PermissionsResponse>> {
    let user_id = user.user_id()?;
    let permissions = state.service.get_permissions(user_id).await?;
    Ok(Json(PermissionsResponse {
        user_id,
        permissions,
    }))
}
