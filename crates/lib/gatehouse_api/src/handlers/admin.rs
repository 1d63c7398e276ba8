//! Account administration handlers. Mounted behind `admin:*`.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::AppState;
use crate::error::AppResult;
use crate::models::PermissionsResponse;

/// `POST /admin/users/{id}/block`
pub async fn block_handler(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.service.block(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /admin/users/{id}/unblock`
pub async fn unblock_handler(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.service.unblock(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /admin/users/{id}/permissions`
pub async fn permissions_handler(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<PermissionsResponse>> {
    let permissions = state.service.get_permissions(user_id).await?;
    Ok(Json(PermissionsResponse {
        user_id,
        permissions,
    }))
}
