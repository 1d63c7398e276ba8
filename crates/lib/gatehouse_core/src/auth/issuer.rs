//! Credential issuing and refresh-token bookkeeping.
//!
//! A refresh token is a signed JWT whose `jti` must be present in the
//! owner's `refresh_tokens`; removing the id revokes the token.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use super::AuthError;
use super::jwt;
use crate::clock::SharedClock;
use crate::config::AuthConfig;
use crate::models::auth::{RefreshClaims, TokenClaims, TokenPair};
use crate::models::user::User;
use crate::users::UserStore;

/// Signs credential pairs and tracks refresh tokens in the [`UserStore`].
#[derive(Clone)]
pub struct TokenIssuer {
    users: Arc<dyn UserStore>,
    secret: Arc<[u8]>,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
    clock: SharedClock,
}

impl TokenIssuer {
    pub fn new(
        users: Arc<dyn UserStore>,
        secret: impl AsRef<[u8]>,
        config: &AuthConfig,
        clock: SharedClock,
    ) -> Self {
        Self {
            users,
            secret: Arc::from(secret.as_ref()),
            access_ttl_secs: config.access_ttl_secs,
            refresh_ttl_secs: config.refresh_ttl_secs,
            clock,
        }
    }

    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl_secs
    }

    /// Issue a fresh pair for an established principal and register the
    /// refresh token id.
    pub async fn issue(&self, user: &User) -> Result<TokenPair, AuthError> {
        let now = self.clock.now();
        let permissions = user.permissions();
        let access_token =
            jwt::sign_access_token(user, &permissions, now, self.access_ttl_secs, &self.secret)?;
        let jti = Uuid::new_v4().to_string();
        let refresh_token =
            jwt::sign_refresh_token(user.id, &jti, now, self.refresh_ttl_secs, &self.secret)?;
        self.users.add_refresh_token(user.id, &jti).await?;
        debug!(user_id = %user.id, "issued credential pair");
        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.access_ttl_secs,
            user: user.clone(),
            permissions,
        })
    }

    /// Exchange a refresh token for a new pair, revoking the old one.
    ///
    /// Unknown, revoked or already rotated tokens fail closed with
    /// `InvalidCredential`.
    pub async fn rotate(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.verify_refresh(refresh_token)?;
        let user_id = subject(&claims.sub)?;
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidCredential)?;
        if !user.refresh_tokens.contains(&claims.jti) {
            return Err(AuthError::InvalidCredential);
        }
        if user.is_blocked {
            return Err(AuthError::AccountBlocked);
        }
        // A concurrent rotation of the same token loses here.
        if !self.users.remove_refresh_token(user.id, &claims.jti).await? {
            return Err(AuthError::InvalidCredential);
        }
        self.issue(&user).await
    }

    /// Revoke one refresh token owned by `user_id`. Revoking a token that
    /// is already gone is a no-op.
    pub async fn revoke(&self, user_id: Uuid, refresh_token: &str) -> Result<(), AuthError> {
        let claims = self.verify_refresh(refresh_token)?;
        if subject(&claims.sub)? != user_id {
            return Err(AuthError::InvalidCredential);
        }
        self.users.remove_refresh_token(user_id, &claims.jti).await?;
        Ok(())
    }

    /// Revoke every refresh token of `user_id`.
    pub async fn revoke_all(&self, user_id: Uuid) -> Result<(), AuthError> {
        self.users.remove_all_refresh_tokens(user_id).await
    }

    pub fn verify_access(&self, token: &str) -> Result<TokenClaims, AuthError> {
        jwt::verify_access_token(token, &self.secret)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, AuthError> {
        jwt::verify_refresh_token(token, &self.secret)
    }
}

/// Parse a `sub` claim; a malformed subject is an invalid credential.
pub fn subject(sub: &str) -> Result<Uuid, AuthError> {
    sub.parse().map_err(|_| AuthError::InvalidCredential)
}
