//! User store contract and backends.
//!
//! Absence is reported as `Ok(None)`; `Err` always means the store failed
//! or refused the operation.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::AuthError;
use crate::models::user::{ExternalAuthBinding, User};
use crate::providers::ExternalAuthProvider;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

/// Durable record of identities, roles and active refresh tokens.
///
/// Every mutation bumps `updated_at`; only [`create`](UserStore::create)
/// sets `created_at`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError>;

    async fn find_by_external_auth(
        &self,
        provider: &dyn ExternalAuthProvider,
        external_id: &str,
    ) -> Result<Option<User>, AuthError>;

    /// Insert a user, assigning its id and both timestamps.
    ///
    /// Fails with `DuplicateKey` when the email or any external binding is
    /// already taken.
    async fn create(&self, user: User) -> Result<User, AuthError>;

    /// Replace the profile fields of the stored document: email, name,
    /// password hash, roles and external bindings. `created_at`,
    /// `refresh_tokens` and `is_blocked` keep their stored values; those
    /// change only through their own operations.
    async fn update(&self, user: User) -> Result<User, AuthError>;

    /// Atomically add one external binding, leaving the rest of the document
    /// as stored. Re-binding the same id is a no-op.
    ///
    /// `ValidationError` when the user is already bound to a different id
    /// for `provider`; `DuplicateKey` when another user holds the binding.
    async fn bind_external_auth(
        &self,
        user_id: Uuid,
        provider: &str,
        binding: ExternalAuthBinding,
    ) -> Result<User, AuthError>;

    /// Register a refresh token id. Adding a present id is a no-op.
    async fn add_refresh_token(&self, user_id: Uuid, token: &str) -> Result<(), AuthError>;

    /// Drop a refresh token id. Returns whether it was present.
    async fn remove_refresh_token(&self, user_id: Uuid, token: &str) -> Result<bool, AuthError>;

    async fn remove_all_refresh_tokens(&self, user_id: Uuid) -> Result<(), AuthError>;

    async fn block(&self, user_id: Uuid) -> Result<(), AuthError>;

    async fn unblock(&self, user_id: Uuid) -> Result<(), AuthError>;

    /// Replace the role set. An empty set is rejected.
    async fn set_roles(&self, user_id: Uuid, roles: &[String]) -> Result<(), AuthError>;

    /// Permissions of an existing user.
    async fn get_permissions(&self, user_id: Uuid) -> Result<Vec<String>, AuthError> {
        let user = self
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("user {user_id}")))?;
        Ok(user.permissions())
    }
}

/// `NotFound` for a user id that matched nothing.
pub(crate) fn user_not_found(user_id: Uuid) -> AuthError {
    AuthError::NotFound(format!("user {user_id}"))
}

pub(crate) fn ensure_roles(roles: &[String]) -> Result<(), AuthError> {
    if roles.is_empty() {
        return Err(AuthError::ValidationError(
            "user must have at least one role".into(),
        ));
    }
    Ok(())
}
