//! OAuth callback handler.

use axum::Json;
use axum::extract::{Path, Query, State};
use tracing::debug;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{OAuthCallbackParams, TokenResponse};

/// `GET /auth/oauth/{provider}/callback`: finish a provider login.
pub async fn oauth_callback_handler(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(params): Query<OAuthCallbackParams>,
) -> AppResult<Json<TokenResponse>> {
    if let Some(error) = params.error {
        debug!(provider = %provider, error = %error, "provider returned an error");
        return Err(AppError::Unauthorized(
            crate::error::AUTHENTICATION_FAILED.into(),
        ));
    }
    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::Validation("missing code".into()))?;
    let pair = state.service.oauth_login(&provider, &code).await?;
    Ok(Json(pair.into()))
}
