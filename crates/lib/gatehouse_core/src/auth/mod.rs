//! Authentication and authorization logic.
//!
//! Provides password hashing, JWT management and the error taxonomy shared
//! by every store, the login session protocol and `gatehouse_api`.

pub mod issuer;
pub mod jwt;
pub mod password;

use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Invalid credentials")]
    InvalidCredential,

    #[error("Account blocked")]
    AccountBlocked,

    /// Authenticated, but not the owner of the resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Expired")]
    Expired,

    #[error("Backing store unavailable: {0}")]
    Unavailable(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Whether a single store call may be retried after this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::Unavailable(_))
    }
}

/// Postgres unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

impl From<sqlx::Error> for AuthError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AuthError::NotFound("row not found".into()),
            sqlx::Error::Database(ref db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                AuthError::DuplicateKey(db.constraint().unwrap_or("unique").to_string())
            }
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed => AuthError::Unavailable(e.to_string()),
            _ => AuthError::Internal(e.to_string()),
        }
    }
}
