//! Process-local user store.
//!
//! Backs tests and the server's `--in-memory` development mode. A single
//! lock makes each operation atomic, matching the per-document atomicity
//! of the Postgres store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{UserStore, ensure_roles, user_not_found};
use crate::auth::AuthError;
use crate::clock::{SharedClock, system_clock};
use crate::models::user::{ExternalAuthBinding, User};
use crate::providers::{ExternalAuthProvider, external_id_at};

/// In-memory [`UserStore`].
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
    clock: SharedClock,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::with_clock(system_clock())
    }

    pub fn with_clock(clock: SharedClock) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    async fn mutate<F>(&self, user_id: Uuid, f: F) -> Result<(), AuthError>
    where
        F: FnOnce(&mut User) + Send,
    {
        let mut users = self.users.write().await;
        let user = users.get_mut(&user_id).ok_or_else(|| user_not_found(user_id))?;
        f(user);
        user.updated_at = self.clock.now();
        Ok(())
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject `candidate` if another user already owns its email or bindings.
fn check_unique(users: &HashMap<Uuid, User>, candidate: &User) -> Result<(), AuthError> {
    for other in users.values().filter(|u| u.id != candidate.id) {
        if other.email == candidate.email {
            return Err(AuthError::DuplicateKey(format!(
                "email {} already registered",
                candidate.email
            )));
        }
        for (provider, binding) in &candidate.external_auth {
            if other.external_id(provider) == Some(binding.id.as_str()) {
                return Err(AuthError::DuplicateKey(format!(
                    "{provider} account {} already linked",
                    binding.id
                )));
            }
        }
    }
    Ok(())
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_external_auth(
        &self,
        provider: &dyn ExternalAuthProvider,
        external_id: &str,
    ) -> Result<Option<User>, AuthError> {
        let path = provider.field_path();
        let users = self.users.read().await;
        for user in users.values() {
            let doc = serde_json::to_value(&user.external_auth)
                .map_err(|e| AuthError::Internal(format!("external_auth encode: {e}")))?;
            if external_id_at(&doc, &path) == Some(external_id) {
                return Ok(Some(user.clone()));
            }
        }
        Ok(None)
    }

    async fn create(&self, mut user: User) -> Result<User, AuthError> {
        user.validate()?;
        let mut users = self.users.write().await;
        user.id = Uuid::now_v7();
        check_unique(&users, &user)?;
        let now = self.clock.now();
        user.created_at = now;
        user.updated_at = now;
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, mut user: User) -> Result<User, AuthError> {
        user.validate()?;
        let mut users = self.users.write().await;
        let stored = users.get(&user.id).ok_or_else(|| user_not_found(user.id))?;
        user.created_at = stored.created_at;
        user.refresh_tokens = stored.refresh_tokens.clone();
        user.is_blocked = stored.is_blocked;
        check_unique(&users, &user)?;
        user.updated_at = self.clock.now();
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn bind_external_auth(
        &self,
        user_id: Uuid,
        provider: &str,
        binding: ExternalAuthBinding,
    ) -> Result<User, AuthError> {
        let mut users = self.users.write().await;
        let taken = users
            .values()
            .any(|u| u.id != user_id && u.external_id(provider) == Some(binding.id.as_str()));
        if taken {
            return Err(AuthError::DuplicateKey(format!(
                "{provider} account {} already linked",
                binding.id
            )));
        }
        let user = users.get_mut(&user_id).ok_or_else(|| user_not_found(user_id))?;
        user.bind_provider(provider, &binding.id, binding.email.as_deref())?;
        user.updated_at = self.clock.now();
        Ok(user.clone())
    }

    async fn add_refresh_token(&self, user_id: Uuid, token: &str) -> Result<(), AuthError> {
        self.mutate(user_id, |u| {
            if !u.refresh_tokens.iter().any(|t| t == token) {
                u.refresh_tokens.push(token.to_string());
            }
        })
        .await
    }

    async fn remove_refresh_token(&self, user_id: Uuid, token: &str) -> Result<bool, AuthError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&user_id).ok_or_else(|| user_not_found(user_id))?;
        let before = user.refresh_tokens.len();
        user.refresh_tokens.retain(|t| t != token);
        let removed = user.refresh_tokens.len() != before;
        user.updated_at = self.clock.now();
        Ok(removed)
    }

    async fn remove_all_refresh_tokens(&self, user_id: Uuid) -> Result<(), AuthError> {
        self.mutate(user_id, |u| u.refresh_tokens.clear()).await
    }

    async fn block(&self, user_id: Uuid) -> Result<(), AuthError> {
        self.mutate(user_id, |u| u.is_blocked = true).await
    }

    async fn unblock(&self, user_id: Uuid) -> Result<(), AuthError> {
        self.mutate(user_id, |u| u.is_blocked = false).await
    }

    async fn set_roles(&self, user_id: Uuid, roles: &[String]) -> Result<(), AuthError> {
        ensure_roles(roles)?;
        self.mutate(user_id, |u| u.roles = roles.to_vec()).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::providers::NamedProvider;

    fn store_with_clock() -> (MemoryUserStore, ManualClock) {
        let clock = ManualClock::new(Utc::now());
        (MemoryUserStore::with_clock(Arc::new(clock.clone())), clock)
    }

    #[tokio::test]
    async fn create_assigns_identity_and_timestamps() {
        let (store, clock) = store_with_clock();
        let user = store
            .create(User::new("alice@example.com", "Alice"))
            .await
            .unwrap();
        assert!(!user.id.is_nil());
        assert_eq!(user.created_at, clock.now());
        assert_eq!(user.updated_at, clock.now());
        let found = store.find_by_email("alice@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryUserStore::new();
        store
            .create(User::new("alice@example.com", "Alice"))
            .await
            .unwrap();
        let err = store
            .create(User::new("ALICE@example.com", "Other Alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateKey(_)));
        store
            .create(User::new("bob@example.com", "Bob"))
            .await
            .unwrap();
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn duplicate_external_binding_is_rejected() {
        let store = MemoryUserStore::new();
        let mut first = User::new("a@example.com", "A");
        first.bind_provider("github", "42", None).unwrap();
        store.create(first).await.unwrap();

        let mut second = User::new("b@example.com", "B");
        second.bind_provider("github", "42", None).unwrap();
        assert!(matches!(
            store.create(second).await,
            Err(AuthError::DuplicateKey(_))
        ));

        // Same external id under another provider is fine.
        let mut third = User::new("c@example.com", "C");
        third.bind_provider("yandex", "42", None).unwrap();
        store.create(third).await.unwrap();
    }

    #[tokio::test]
    async fn find_by_external_auth_uses_provider_path() {
        let store = MemoryUserStore::new();
        let mut user = User::new("a@example.com", "A");
        user.bind_provider("yandex", "y-1", None).unwrap();
        let user = store.create(user).await.unwrap();

        let yandex = NamedProvider::new("yandex");
        let github = NamedProvider::new("github");
        let found = store.find_by_external_auth(&yandex, "y-1").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
        assert!(store.find_by_external_auth(&github, "y-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_keeps_created_at_and_bumps_updated_at() {
        let (store, clock) = store_with_clock();
        let user = store
            .create(User::new("alice@example.com", "Alice"))
            .await
            .unwrap();
        clock.advance(Duration::seconds(10));
        let mut changed = user.clone();
        changed.full_name = "Alice Liddell".into();
        changed.created_at = clock.now();
        let updated = store.update(changed).await.unwrap();
        assert_eq!(updated.created_at, user.created_at);
        assert_eq!(updated.updated_at, clock.now());
        assert_eq!(updated.full_name, "Alice Liddell");
    }

    #[tokio::test]
    async fn stale_update_cannot_restore_revoked_tokens_or_unblock() {
        let store = MemoryUserStore::new();
        let user = store
            .create(User::new("alice@example.com", "Alice"))
            .await
            .unwrap();
        store.add_refresh_token(user.id, "rt1").await.unwrap();
        let stale = store.find_by_id(user.id).await.unwrap().unwrap();

        store.remove_refresh_token(user.id, "rt1").await.unwrap();
        store.block(user.id).await.unwrap();

        let mut changed = stale;
        changed.full_name = "Alice Liddell".into();
        let updated = store.update(changed).await.unwrap();
        assert!(updated.refresh_tokens.is_empty());
        assert!(updated.is_blocked);
        assert_eq!(updated.full_name, "Alice Liddell");
    }

    #[tokio::test]
    async fn bind_external_auth_touches_only_the_binding() {
        let store = MemoryUserStore::new();
        let user = store
            .create(User::new("alice@example.com", "Alice"))
            .await
            .unwrap();
        store.add_refresh_token(user.id, "rt1").await.unwrap();

        let binding = ExternalAuthBinding {
            id: "583231".into(),
            email: Some("alice@example.com".into()),
        };
        let bound = store
            .bind_external_auth(user.id, "github", binding.clone())
            .await
            .unwrap();
        assert_eq!(bound.external_id("github"), Some("583231"));
        assert_eq!(bound.refresh_tokens, vec!["rt1"]);

        // Idempotent for the same id, rejected for a different one.
        store
            .bind_external_auth(user.id, "github", binding.clone())
            .await
            .unwrap();
        let other_id = ExternalAuthBinding {
            id: "999".into(),
            email: None,
        };
        assert!(matches!(
            store.bind_external_auth(user.id, "github", other_id).await,
            Err(AuthError::ValidationError(_))
        ));

        let bob = store
            .create(User::new("bob@example.com", "Bob"))
            .await
            .unwrap();
        assert!(matches!(
            store.bind_external_auth(bob.id, "github", binding).await,
            Err(AuthError::DuplicateKey(_))
        ));
    }

    #[tokio::test]
    async fn update_of_unknown_user_is_not_found() {
        let store = MemoryUserStore::new();
        let mut ghost = User::new("ghost@example.com", "Ghost");
        ghost.id = Uuid::now_v7();
        assert!(matches!(
            store.update(ghost).await,
            Err(AuthError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn refresh_token_set_membership() {
        let store = MemoryUserStore::new();
        let user = store
            .create(User::new("alice@example.com", "Alice"))
            .await
            .unwrap();
        store.add_refresh_token(user.id, "rt1").await.unwrap();
        store.add_refresh_token(user.id, "rt2").await.unwrap();
        store.add_refresh_token(user.id, "rt1").await.unwrap();
        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_tokens, vec!["rt1", "rt2"]);

        assert!(store.remove_refresh_token(user.id, "rt1").await.unwrap());
        assert!(!store.remove_refresh_token(user.id, "rt1").await.unwrap());

        store.remove_all_refresh_tokens(user.id).await.unwrap();
        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert!(stored.refresh_tokens.is_empty());
    }

    #[tokio::test]
    async fn block_and_unblock_bump_updated_at() {
        let (store, clock) = store_with_clock();
        let user = store
            .create(User::new("alice@example.com", "Alice"))
            .await
            .unwrap();
        clock.advance(Duration::seconds(5));
        store.block(user.id).await.unwrap();
        let blocked = store.find_by_id(user.id).await.unwrap().unwrap();
        assert!(blocked.is_blocked);
        assert_eq!(blocked.updated_at, clock.now());

        store.unblock(user.id).await.unwrap();
        assert!(!store.find_by_id(user.id).await.unwrap().unwrap().is_blocked);
        assert!(matches!(
            store.block(Uuid::now_v7()).await,
            Err(AuthError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn permissions_follow_roles() {
        let store = MemoryUserStore::new();
        let user = store
            .create(User::new("alice@example.com", "Alice"))
            .await
            .unwrap();
        assert_eq!(store.get_permissions(user.id).await.unwrap(), vec!["student:*"]);

        store
            .set_roles(user.id, &["teacher".into(), "admin".into()])
            .await
            .unwrap();
        assert_eq!(
            store.get_permissions(user.id).await.unwrap(),
            vec!["teacher:*", "admin:*"]
        );
        assert!(matches!(
            store.set_roles(user.id, &[]).await,
            Err(AuthError::ValidationError(_))
        ));
        assert!(matches!(
            store.get_permissions(Uuid::now_v7()).await,
            Err(AuthError::NotFound(_))
        ));
    }
}
