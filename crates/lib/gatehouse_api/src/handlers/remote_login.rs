//! Remote-device login handlers.
//!
//! The requesting device starts a session, polls it and consumes it; the
//! authorizing side is an authenticated user who owns the identifier and
//! addresses each session by its request id, never by the token itself.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use uuid::Uuid;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    DecisionRequest, LinkChannelRequest, PendingLoginsResponse, PendingQuery, PollResponse, RemoteLoginResponse,
    StartRemoteLoginRequest, TokenResponse,
};

/// `POST /auth/remote`: start a pending login.
pub async fn start_handler(
    State(state): State<AppState>,
    Json(body): Json<StartRemoteLoginRequest>,
) -> AppResult<(StatusCode, Json<RemoteLoginResponse>)> {
    let token = state
        .service
        .start_remote_login(body.session_type, &body.identifier)
        .await?;
    Ok((StatusCode::CREATED, Json(token.into())))
}

/// `GET /auth/remote/{token}`: current status.
pub async fn poll_handler(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<PollResponse>> {
    let status = state.service.poll_remote_login(&token).await?;
    Ok(Json(PollResponse { status }))
}

/// `POST /auth/remote/{token}/consume`: redeem an authorized token.
pub async fn consume_handler(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<TokenResponse>> {
    let pair = state.service.consume_remote_login(&token).await?;
    Ok(Json(pair.into()))
}

/// `POST /auth/remote/channel`: link a remote-device chat to the caller.
pub async fn link_channel_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<LinkChannelRequest>,
) -> AppResult<StatusCode> {
    state
        .service
        .link_remote_channel(user.user_id()?, &body.identifier)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /auth/remote/pending?identifier=`: the caller's sessions awaiting a decision.
pub async fn pending_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<PendingQuery>,
) -> AppResult<Json<PendingLoginsResponse>> {
    let pending = state
        .service
        .lookup_remote_login(user.user_id()?, &query.identifier)
        .await?;
    Ok(Json(PendingLoginsResponse {
        pending: pending.into_iter().map(Into::into).collect(),
    }))
}

/// `POST /auth/remote/requests/{request_id}/decision`: approve or deny as the caller.
pub async fn decision_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(request_id): Path<Uuid>,
    Json(body): Json<DecisionRequest>,
) -> AppResult<Json<PollResponse>> {
    let decided = state
        .service
        .decide_remote_login(request_id, user.user_id()?, body.approve)
        .await?;
    Ok(Json(PollResponse {
        status: decided.status,
    }))
}
