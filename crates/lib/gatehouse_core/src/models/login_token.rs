//! Cross-device login token records.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthError;

/// Number of random bytes behind a login token (256 bits).
const LOGIN_TOKEN_BYTES: usize = 32;

/// Which kind of device asked for the login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionType {
    Web,
    #[serde(alias = "telegram")]
    RemoteDevice,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Web => "web",
            SessionType::RemoteDevice => "remote-device",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionType {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "web" => Ok(SessionType::Web),
            "remote-device" | "telegram" => Ok(SessionType::RemoteDevice),
            other => Err(AuthError::ValidationError(format!(
                "unknown session type: {other}"
            ))),
        }
    }
}

/// Lifecycle of a login token. Everything but `Pending` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginStatus {
    Pending,
    Authorized,
    Denied,
    Expired,
}

impl LoginStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginStatus::Pending => "pending",
            LoginStatus::Authorized => "authorized",
            LoginStatus::Denied => "denied",
            LoginStatus::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoginStatus::Pending)
    }
}

impl fmt::Display for LoginStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoginStatus {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(LoginStatus::Pending),
            "authorized" => Ok(LoginStatus::Authorized),
            "denied" => Ok(LoginStatus::Denied),
            "expired" => Ok(LoginStatus::Expired),
            other => Err(AuthError::ValidationError(format!(
                "unknown login status: {other}"
            ))),
        }
    }
}

/// The authorizing side's verdict on a pending login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Bind the pending session to this user.
    Authorized(Uuid),
    Denied,
}

impl Decision {
    pub fn status(&self) -> LoginStatus {
        match self {
            Decision::Authorized(_) => LoginStatus::Authorized,
            Decision::Denied => LoginStatus::Denied,
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Decision::Authorized(id) => Some(*id),
            Decision::Denied => None,
        }
    }
}

/// A short-lived session handoff record.
///
/// `token` is the bearer secret held only by the requesting device; the
/// authorizing side addresses the record by `request_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginToken {
    pub token: String,
    pub request_id: Uuid,
    pub session_type: SessionType,
    pub identifier: String,
    pub status: LoginStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LoginToken {
    /// A new pending token expiring `ttl` after `now`.
    pub fn new(session_type: SessionType, identifier: &str, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            token: generate_login_token(),
            request_id: Uuid::new_v4(),
            session_type,
            identifier: identifier.to_string(),
            status: LoginStatus::Pending,
            user_id: None,
            created_at: now,
            expires_at: now + ttl,
            updated_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == LoginStatus::Pending
    }

    /// Strictly after `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Status as seen by a reader at `now`. A pending or authorized record
    /// past its expiry reads as `Expired` even if the store still holds it.
    pub fn effective_status(&self, now: DateTime<Utc>) -> LoginStatus {
        match self.status {
            LoginStatus::Pending | LoginStatus::Authorized if self.is_expired_at(now) => {
                LoginStatus::Expired
            }
            status => status,
        }
    }
}

/// Generate an unguessable login token (URL-safe base64, no padding).
pub fn generate_login_token() -> String {
    let mut bytes = [0u8; LOGIN_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
