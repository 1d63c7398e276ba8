//! JWT signing and verification for access and refresh credentials.

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use tracing::{info, warn};
use uuid::Uuid;

use super::AuthError;
use crate::models::auth::{RefreshClaims, TOKEN_TYPE_ACCESS, TOKEN_TYPE_REFRESH, TokenClaims};
use crate::models::user::User;

/// Length of a generated signing secret.
const GENERATED_SECRET_LEN: usize = 64;

/// Sign an access token (HS256) for `user` carrying its roles and permissions.
pub fn sign_access_token(
    user: &User,
    permissions: &[String],
    now: DateTime<Utc>,
    ttl_secs: i64,
    secret: &[u8],
) -> Result<String, AuthError> {
    let claims = TokenClaims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        roles: user.roles.clone(),
        permissions: permissions.to_vec(),
        typ: TOKEN_TYPE_ACCESS.to_string(),
        exp: (now + Duration::seconds(ttl_secs)).timestamp(),
        iat: now.timestamp(),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
        .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
}

/// Sign a refresh token (HS256) identified by `jti`.
pub fn sign_refresh_token(
    user_id: Uuid,
    jti: &str,
    now: DateTime<Utc>,
    ttl_secs: i64,
    secret: &[u8],
) -> Result<String, AuthError> {
    let claims = RefreshClaims {
        sub: user_id.to_string(),
        jti: jti.to_string(),
        typ: TOKEN_TYPE_REFRESH.to_string(),
        exp: (now + Duration::seconds(ttl_secs)).timestamp(),
        iat: now.timestamp(),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
        .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
}

/// Verify an access token. Bad signature, expiry or a non-access `typ`
/// all fail with `InvalidCredential`.
pub fn verify_access_token(token: &str, secret: &[u8]) -> Result<TokenClaims, AuthError> {
    let claims = decode::<TokenClaims>(token, &DecodingKey::from_secret(secret), &validation())
        .map_err(|_| AuthError::InvalidCredential)?
        .claims;
    if claims.typ != TOKEN_TYPE_ACCESS {
        return Err(AuthError::InvalidCredential);
    }
    Ok(claims)
}

/// Verify a refresh token's signature, expiry and `typ`.
pub fn verify_refresh_token(token: &str, secret: &[u8]) -> Result<RefreshClaims, AuthError> {
    let claims = decode::<RefreshClaims>(token, &DecodingKey::from_secret(secret), &validation())
        .map_err(|_| AuthError::InvalidCredential)?
        .claims;
    if claims.typ != TOKEN_TYPE_REFRESH {
        return Err(AuthError::InvalidCredential);
    }
    Ok(claims)
}

fn validation() -> Validation {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation
}

/// Resolve the JWT secret: env var `JWT_SECRET` → `AUTH_SECRET` → persisted file.
pub fn resolve_jwt_secret() -> String {
    for var in ["JWT_SECRET", "AUTH_SECRET"] {
        if let Ok(secret) = std::env::var(var)
            && !secret.is_empty()
        {
            return secret;
        }
    }
    let secret_path = jwt_secret_path();
    if let Ok(existing) = std::fs::read_to_string(&secret_path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret = generate_secret();
    if let Some(parent) = secret_path.parent()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        warn!(error = %e, "could not create JWT secret directory");
    }
    match std::fs::write(&secret_path, &secret) {
        Ok(()) => info!(path = %secret_path.display(), "generated new JWT secret"),
        Err(e) => warn!(error = %e, "JWT secret not persisted, tokens will not survive a restart"),
    }
    secret
}

fn generate_secret() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_SECRET_LEN)
        .map(char::from)
        .collect()
}

/// Path to the persisted JWT secret file.
fn jwt_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gatehouse")
        .join("jwt-secret")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret";

    fn user() -> User {
        let mut user = User::new("alice@example.com", "Alice");
        user.id = Uuid::now_v7();
        user
    }

    #[test]
    fn access_token_roundtrip() {
        let user = user();
        let token =
            sign_access_token(&user, &["student:*".into()], Utc::now(), 900, SECRET).unwrap();
        let claims = verify_access_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.roles, vec!["student"]);
        assert!(claims.has_permission("student:*"));
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign_access_token(&user(), &[], Utc::now(), 900, SECRET).unwrap();
        assert!(matches!(
            verify_access_token(&token, b"other"),
            Err(AuthError::InvalidCredential)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let issued = Utc::now() - Duration::hours(2);
        let token = sign_access_token(&user(), &[], issued, 60, SECRET).unwrap();
        assert!(verify_access_token(&token, SECRET).is_err());
    }

    #[test]
    fn token_types_are_not_interchangeable() {
        let user = user();
        let refresh = sign_refresh_token(user.id, "jti-1", Utc::now(), 3600, SECRET).unwrap();
        assert!(verify_access_token(&refresh, SECRET).is_err());
        let claims = verify_refresh_token(&refresh, SECRET).unwrap();
        assert_eq!(claims.jti, "jti-1");

        let access = sign_access_token(&user, &[], Utc::now(), 900, SECRET).unwrap();
        assert!(verify_refresh_token(&access, SECRET).is_err());
    }

    #[test]
    fn generated_secret_is_alphanumeric() {
        let secret = generate_secret();
        assert_eq!(secret.len(), GENERATED_SECRET_LEN);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
