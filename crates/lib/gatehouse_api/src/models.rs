//! Request and response bodies.

use chrono::{DateTime, Utc};
use gatehouse_core::models::auth::TokenPair;
use gatehouse_core::models::login_token::{LoginStatus, LoginToken, SessionType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// -- credentials ------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Either one refresh token or `all: true`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub all: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
    pub user: AuthUser,
    pub permissions: Vec<String>,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_in: pair.expires_in,
            token_type: "Bearer".to_string(),
            user: AuthUser {
                id: pair.user.id,
                email: pair.user.email,
                name: pair.user.full_name,
                roles: pair.user.roles,
            },
            permissions: pair.permissions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsResponse {
    pub user_id: Uuid,
    pub permissions: Vec<String>,
}

/// Query parameters of the OAuth callback.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthCallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

// -- remote-device login ----------------------------------------------------

fn default_session_type() -> SessionType {
    SessionType::RemoteDevice
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRemoteLoginRequest {
    #[serde(default = "default_session_type")]
    pub session_type: SessionType,
    pub identifier: String,
}

/// A login token as shown to the device that requested it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteLoginResponse {
    pub token: String,
    pub request_id: Uuid,
    pub session_type: SessionType,
    pub identifier: String,
    pub status: LoginStatus,
    pub expires_at: DateTime<Utc>,
}

impl From<LoginToken> for RemoteLoginResponse {
    fn from(t: LoginToken) -> Self {
        Self {
            token: t.token,
            request_id: t.request_id,
            session_type: t.session_type,
            identifier: t.identifier,
            status: t.status,
            expires_at: t.expires_at,
        }
    }
}

/// A pending login as shown to the approving account. Carries no secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingLoginResponse {
    pub request_id: Uuid,
    pub session_type: SessionType,
    pub identifier: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<LoginToken> for PendingLoginResponse {
    fn from(t: LoginToken) -> Self {
        Self {
            request_id: t.request_id,
            session_type: t.session_type,
            identifier: t.identifier,
            created_at: t.created_at,
            expires_at: t.expires_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollResponse {
    pub status: LoginStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PendingQuery {
    pub identifier: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingLoginsResponse {
    pub pending: Vec<PendingLoginResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub approve: bool,
}

/// Body of `POST /auth/remote/channel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkChannelRequest {
    pub identifier: String,
}
