//! Credential models.
//!
//! Claims embedded in the signed tokens plus the pair handed back to a
//! client after a successful login.

use serde::{Deserialize, Serialize};

use super::user::User;

/// `typ` claim of access tokens.
pub const TOKEN_TYPE_ACCESS: &str = "access";

/// `typ` claim of refresh tokens.
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

/// JWT claims embedded in access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: user ID.
    pub sub: String,
    /// User email.
    pub email: String,
    /// User roles (e.g. `["admin"]`).
    pub roles: Vec<String>,
    /// Permissions resolved from the roles (e.g. `["admin:*"]`).
    pub permissions: Vec<String>,
    /// Token type, always `access`.
    pub typ: String,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
}

impl TokenClaims {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

/// JWT claims embedded in refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    /// Identifier registered in the user's `refresh_tokens`.
    pub jti: String,
    /// Token type, always `refresh`.
    pub typ: String,
    pub exp: i64,
    pub iat: i64,
}

/// A freshly issued credential pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: User,
    pub permissions: Vec<String>,
}
