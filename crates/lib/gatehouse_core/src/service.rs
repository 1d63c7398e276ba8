//! Auth orchestrator.
//!
//! Composes the user store, login session protocol and token issuer into
//! the entry flows exposed to the HTTP layer: password login, OAuth login
//! and remote-device login, plus refresh, logout and account administration.

use std::sync::Arc;

use chrono::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthError;
use crate::auth::issuer::TokenIssuer;
use crate::auth::password::{hash_password, verify_password};
use crate::clock::SharedClock;
use crate::config::AuthConfig;
use crate::login_tokens::{LoginSessions, LoginTokenStore};
use crate::models::auth::{TokenClaims, TokenPair};
use crate::models::login_token::{Decision, LoginStatus, LoginToken, SessionType};
use crate::models::user::{ExternalAuthBinding, ExternalIdentity, User};
use crate::oauth::OAuthExchange;
use crate::providers::{CHANNEL_TELEGRAM, ProviderRegistry};
use crate::users::UserStore;
use crate::validation;

/// Which refresh credentials a logout revokes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoutScope {
    /// Only the device holding this refresh token.
    Token(String),
    /// Every device.
    All,
}

/// The authentication orchestrator.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: LoginSessions,
    issuer: TokenIssuer,
    oauth: Arc<dyn OAuthExchange>,
    providers: ProviderRegistry,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        login_tokens: Arc<dyn LoginTokenStore>,
        oauth: Arc<dyn OAuthExchange>,
        secret: impl AsRef<[u8]>,
        config: AuthConfig,
        clock: SharedClock,
    ) -> Self {
        let sessions = LoginSessions::new(
            login_tokens,
            clock.clone(),
            Duration::seconds(config.login_token_ttl_secs),
        );
        let issuer = TokenIssuer::new(users.clone(), secret, &config, clock);
        Self {
            users,
            sessions,
            issuer,
            oauth,
            providers: ProviderRegistry::default(),
            config,
        }
    }

    /// Replace the external provider registry.
    pub fn with_providers(mut self, providers: ProviderRegistry) -> Self {
        self.providers = providers;
        self
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn users(&self) -> &Arc<dyn UserStore> {
        &self.users
    }

    pub fn sessions(&self) -> &LoginSessions {
        &self.sessions
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    // -- direct login ------------------------------------------------------

    /// Create a password account and sign it in.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<TokenPair, AuthError> {
        let email = validation::parse_email(email)?;
        validation::validate_password(password, self.config.min_password_len)?;
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::DuplicateKey(format!(
                "email {email} already registered"
            )));
        }
        let name = match full_name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => validation::generate_anonymous_name(),
        };
        let mut user = User::new(&email, &name);
        user.password_hash = Some(hash_password(password, self.config.password_cost)?);
        let user = self.users.create(user).await?;
        info!(user_id = %user.id, "user registered");
        self.issue_for(&user).await
    }

    /// Email + password login.
    ///
    /// Unknown email, a password-less account and a wrong password are
    /// indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let email = validation::normalize_email(email);
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredential)?;
        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredential)?;
        if !verify_password(password, hash)? {
            return Err(AuthError::InvalidCredential);
        }
        self.issue_for(&user).await
    }

    // -- OAuth -------------------------------------------------------------

    /// Exchange a provider callback code and sign the identity in.
    pub async fn oauth_login(&self, provider: &str, code: &str) -> Result<TokenPair, AuthError> {
        self.providers.resolve(provider)?;
        let identity = self.oauth.exchange(provider, code).await?;
        self.external_login(&identity).await
    }

    /// Sign in a normalized external identity: match by binding, else link
    /// by email, else create.
    pub async fn external_login(&self, identity: &ExternalIdentity) -> Result<TokenPair, AuthError> {
        let user = self.find_or_link(identity).await?;
        self.issue_for(&user).await
    }

    async fn find_or_link(&self, identity: &ExternalIdentity) -> Result<User, AuthError> {
        let provider = self.providers.resolve(&identity.provider)?;
        if let Some(user) = self
            .users
            .find_by_external_auth(provider.as_ref(), &identity.external_id)
            .await?
        {
            return Ok(user);
        }

        let email = validation::parse_email(&identity.email)?;
        if let Some(user) = self.users.find_by_email(&email).await? {
            let binding = ExternalAuthBinding {
                id: identity.external_id.clone(),
                email: Some(email.clone()),
            };
            let user = self
                .users
                .bind_external_auth(user.id, provider.name(), binding)
                .await?;
            info!(user_id = %user.id, provider = provider.name(), "linked external account");
            return Ok(user);
        }

        let name = identity
            .display_name
            .clone()
            .unwrap_or_else(validation::generate_anonymous_name);
        let mut user = User::new(&email, &name);
        user.bind_provider(provider.name(), &identity.external_id, Some(&email))?;
        match self.users.create(user).await {
            Ok(user) => {
                info!(user_id = %user.id, provider = provider.name(), "user created from external account");
                Ok(user)
            }
            // Lost a race with a concurrent first login of the same identity.
            Err(AuthError::DuplicateKey(key)) => self
                .users
                .find_by_external_auth(provider.as_ref(), &identity.external_id)
                .await?
                .ok_or(AuthError::DuplicateKey(key)),
            Err(e) => Err(e),
        }
    }

    // -- remote-device login -----------------------------------------------

    pub async fn start_remote_login(
        &self,
        session_type: SessionType,
        identifier: &str,
    ) -> Result<LoginToken, AuthError> {
        self.sessions.create(session_type, identifier).await
    }

    /// Link a remote-device chat to `user_id`, making its login requests
    /// visible to and decidable by that user.
    pub async fn link_remote_channel(&self, user_id: Uuid, chat_id: &str) -> Result<(), AuthError> {
        let chat_id = chat_id.trim();
        if chat_id.is_empty() {
            return Err(AuthError::ValidationError("chat id must not be empty".into()));
        }
        let binding = ExternalAuthBinding {
            id: chat_id.to_string(),
            email: None,
        };
        self.users
            .bind_external_auth(user_id, CHANNEL_TELEGRAM, binding)
            .await?;
        info!(%user_id, "remote channel linked");
        Ok(())
    }

    /// Pending requests on `identifier` that `caller` may decide.
    pub async fn lookup_remote_login(
        &self,
        caller: Uuid,
        identifier: &str,
    ) -> Result<Vec<LoginToken>, AuthError> {
        let user = self.principal(caller).await?;
        if !owns_identifier(&user, SessionType::Web, identifier)
            && !owns_identifier(&user, SessionType::RemoteDevice, identifier)
        {
            return Err(AuthError::Forbidden(
                "login identifier is not linked to this account".into(),
            ));
        }
        Ok(self
            .sessions
            .lookup_by_identifier(identifier)
            .await?
            .into_iter()
            .filter(|t| owns_identifier(&user, t.session_type, &t.identifier))
            .collect())
    }

    /// Decide the pending login behind `request_id` on behalf of the
    /// authenticated `approver`, who must own the request's identifier.
    ///
    /// An approval binds the session to the approver; a blocked approver
    /// cannot approve anything.
    pub async fn decide_remote_login(
        &self,
        request_id: Uuid,
        approver: Uuid,
        approve: bool,
    ) -> Result<LoginToken, AuthError> {
        let user = self.principal(approver).await?;
        let record = self
            .sessions
            .find_request(request_id)
            .await?
            .ok_or(AuthError::Expired)?;
        if !owns_identifier(&user, record.session_type, &record.identifier) {
            warn!(%approver, %request_id, "decision on a foreign login request");
            return Err(AuthError::Forbidden(
                "login request belongs to another account".into(),
            ));
        }
        let decision = if approve {
            if user.is_blocked {
                return Err(AuthError::AccountBlocked);
            }
            Decision::Authorized(user.id)
        } else {
            Decision::Denied
        };
        self.sessions.decide(&record.token, decision).await
    }

    pub async fn poll_remote_login(&self, token: &str) -> Result<LoginStatus, AuthError> {
        self.sessions.poll(token).await
    }

    /// Redeem an authorized session token for a credential pair.
    pub async fn consume_remote_login(&self, token: &str) -> Result<TokenPair, AuthError> {
        let user_id = self.sessions.consume(token).await?;
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("user {user_id}")))?;
        self.issue_for(&user).await
    }

    // -- credentials -------------------------------------------------------

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        self.issuer.rotate(refresh_token).await
    }

    pub async fn logout(&self, user_id: Uuid, scope: LogoutScope) -> Result<(), AuthError> {
        match scope {
            LogoutScope::Token(token) => self.issuer.revoke(user_id, &token).await?,
            LogoutScope::All => self.issuer.revoke_all(user_id).await?,
        }
        info!(%user_id, "logged out");
        Ok(())
    }

    /// Validate a bearer access token.
    pub fn verify_access(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.issuer.verify_access(token)
    }

    // -- administration ----------------------------------------------------

    /// Block a user and revoke all of their refresh tokens.
    pub async fn block(&self, user_id: Uuid) -> Result<(), AuthError> {
        self.users.block(user_id).await?;
        self.users.remove_all_refresh_tokens(user_id).await?;
        warn!(%user_id, "user blocked");
        Ok(())
    }

    pub async fn unblock(&self, user_id: Uuid) -> Result<(), AuthError> {
        self.users.unblock(user_id).await?;
        info!(%user_id, "user unblocked");
        Ok(())
    }

    pub async fn set_roles(&self, user_id: Uuid, roles: &[String]) -> Result<(), AuthError> {
        self.users.set_roles(user_id, roles).await
    }

    pub async fn get_permissions(&self, user_id: Uuid) -> Result<Vec<String>, AuthError> {
        self.users.get_permissions(user_id).await
    }

    /// The stored user behind an authenticated subject.
    async fn principal(&self, user_id: Uuid) -> Result<User, AuthError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidCredential)
    }

    async fn issue_for(&self, user: &User) -> Result<TokenPair, AuthError> {
        if user.is_blocked {
            return Err(AuthError::AccountBlocked);
        }
        self.issuer.issue(user).await
    }
}

/// Web logins are addressed by account email, remote-device logins by a
/// chat linked through [`AuthService::link_remote_channel`].
fn owns_identifier(user: &User, session_type: SessionType, identifier: &str) -> bool {
    match session_type {
        SessionType::Web => user.email == validation::normalize_email(identifier),
        SessionType::RemoteDevice => user.external_id(CHANNEL_TELEGRAM) == Some(identifier.trim()),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::clock::ManualClock;
    use crate::login_tokens::MemoryLoginTokenStore;
    use crate::users::MemoryUserStore;

    /// Fixed-answer OAuth exchange.
    struct StaticExchange(ExternalIdentity);

    #[async_trait]
    impl OAuthExchange for StaticExchange {
        async fn exchange(&self, provider: &str, code: &str) -> Result<ExternalIdentity, AuthError> {
            if code != "good-code" || provider != self.0.provider {
                return Err(AuthError::InvalidCredential);
            }
            Ok(self.0.clone())
        }
    }

    fn github_identity() -> ExternalIdentity {
        ExternalIdentity {
            provider: "github".into(),
            external_id: "583231".into(),
            email: "octo@example.com".into(),
            display_name: Some("Octo Cat".into()),
        }
    }

    fn service() -> (AuthService, ManualClock) {
        let clock = ManualClock::new(Utc::now());
        let shared: SharedClock = Arc::new(clock.clone());
        let config = AuthConfig {
            password_cost: 4,
            ..AuthConfig::default()
        };
        let service = AuthService::new(
            Arc::new(MemoryUserStore::with_clock(shared.clone())),
            Arc::new(MemoryLoginTokenStore::with_clock(shared.clone())),
            Arc::new(StaticExchange(github_identity())),
            "test-secret",
            config,
            shared,
        );
        (service, clock)
    }

    #[tokio::test]
    async fn register_then_login() {
        let (svc, _) = service();
        let registered = svc
            .register("Alice@Example.com", "password123", Some("Alice"))
            .await
            .unwrap();
        assert_eq!(registered.user.email, "alice@example.com");
        assert_eq!(registered.permissions, vec!["student:*"]);

        let pair = svc.login("alice@example.com", "password123").await.unwrap();
        assert_eq!(pair.user.id, registered.user.id);
        assert!(svc.verify_access(&pair.access_token).is_ok());
    }

    #[tokio::test]
    async fn register_validates_input() {
        let (svc, _) = service();
        assert!(matches!(
            svc.register("not-an-email", "password123", None).await,
            Err(AuthError::ValidationError(_))
        ));
        assert!(matches!(
            svc.register("bob@example.com", "short", None).await,
            Err(AuthError::ValidationError(_))
        ));
        let anon = svc.register("bob@example.com", "password123", None).await.unwrap();
        assert!(anon.user.is_anonymous());
        assert!(matches!(
            svc.register("bob@example.com", "password123", None).await,
            Err(AuthError::DuplicateKey(_))
        ));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let (svc, _) = service();
        svc.register("alice@example.com", "password123", None).await.unwrap();
        assert!(matches!(
            svc.login("alice@example.com", "wrong-password").await,
            Err(AuthError::InvalidCredential)
        ));
        assert!(matches!(
            svc.login("nobody@example.com", "password123").await,
            Err(AuthError::InvalidCredential)
        ));
    }

    #[tokio::test]
    async fn blocked_user_cannot_log_in() {
        let (svc, _) = service();
        let user = svc
            .register("alice@example.com", "password123", None)
            .await
            .unwrap()
            .user;
        svc.block(user.id).await.unwrap();
        assert!(matches!(
            svc.login("alice@example.com", "password123").await,
            Err(AuthError::AccountBlocked)
        ));

        svc.unblock(user.id).await.unwrap();
        assert!(svc.login("alice@example.com", "password123").await.is_ok());
    }

    #[tokio::test]
    async fn block_revokes_refresh_tokens() {
        let (svc, _) = service();
        let pair = svc
            .register("alice@example.com", "password123", None)
            .await
            .unwrap();
        svc.block(pair.user.id).await.unwrap();
        svc.unblock(pair.user.id).await.unwrap();
        assert!(matches!(
            svc.refresh(&pair.refresh_token).await,
            Err(AuthError::InvalidCredential)
        ));
    }

    #[tokio::test]
    async fn refresh_rotates_and_revoked_token_fails() {
        let (svc, _) = service();
        let pair = svc
            .register("alice@example.com", "password123", None)
            .await
            .unwrap();
        let jti = svc.issuer().verify_refresh(&pair.refresh_token).unwrap().jti;
        svc.users()
            .remove_refresh_token(pair.user.id, &jti)
            .await
            .unwrap();
        assert!(matches!(
            svc.refresh(&pair.refresh_token).await,
            Err(AuthError::InvalidCredential)
        ));

        let fresh = svc.login("alice@example.com", "password123").await.unwrap();
        let rotated = svc.refresh(&fresh.refresh_token).await.unwrap();
        assert_ne!(rotated.refresh_token, fresh.refresh_token);
    }

    #[tokio::test]
    async fn logout_single_device_and_everywhere() {
        let (svc, _) = service();
        let laptop = svc
            .register("alice@example.com", "password123", None)
            .await
            .unwrap();
        let phone = svc.login("alice@example.com", "password123").await.unwrap();
        let tablet = svc.login("alice@example.com", "password123").await.unwrap();
        let user_id = laptop.user.id;

        svc.logout(user_id, LogoutScope::Token(laptop.refresh_token.clone()))
            .await
            .unwrap();
        assert!(svc.refresh(&laptop.refresh_token).await.is_err());
        let phone = svc.refresh(&phone.refresh_token).await.unwrap();

        svc.logout(user_id, LogoutScope::All).await.unwrap();
        assert!(svc.refresh(&phone.refresh_token).await.is_err());
        assert!(svc.refresh(&tablet.refresh_token).await.is_err());
    }

    #[tokio::test]
    async fn oauth_creates_then_matches_by_binding() {
        let (svc, _) = service();
        let first = svc.oauth_login("github", "good-code").await.unwrap();
        assert_eq!(first.user.email, "octo@example.com");
        assert_eq!(first.user.full_name, "Octo Cat");

        let second = svc.oauth_login("github", "good-code").await.unwrap();
        assert_eq!(second.user.id, first.user.id);

        assert!(matches!(
            svc.oauth_login("github", "bad-code").await,
            Err(AuthError::InvalidCredential)
        ));
        assert!(matches!(
            svc.oauth_login("myspace", "good-code").await,
            Err(AuthError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn oauth_links_existing_account_by_email() {
        let (svc, _) = service();
        let existing = svc
            .register("octo@example.com", "password123", Some("Octo"))
            .await
            .unwrap()
            .user;
        let pair = svc.oauth_login("github", "good-code").await.unwrap();
        assert_eq!(pair.user.id, existing.id);
        assert_eq!(pair.user.external_id("github"), Some("583231"));
    }

    #[tokio::test]
    async fn linking_an_account_keeps_revocations_and_block() {
        let (svc, _) = service();
        let pair = svc
            .register("octo@example.com", "password123", None)
            .await
            .unwrap();
        svc.logout(pair.user.id, LogoutScope::Token(pair.refresh_token.clone()))
            .await
            .unwrap();

        let linked = svc.oauth_login("github", "good-code").await.unwrap();
        assert_eq!(linked.user.id, pair.user.id);
        assert!(matches!(
            svc.refresh(&pair.refresh_token).await,
            Err(AuthError::InvalidCredential)
        ));

        svc.block(pair.user.id).await.unwrap();
        svc.users().update(linked.user.clone()).await.unwrap();
        assert!(matches!(
            svc.login("octo@example.com", "password123").await,
            Err(AuthError::AccountBlocked)
        ));
    }

    #[tokio::test]
    async fn oauth_login_of_blocked_user_fails() {
        let (svc, _) = service();
        let user = svc.oauth_login("github", "good-code").await.unwrap().user;
        svc.block(user.id).await.unwrap();
        assert!(matches!(
            svc.oauth_login("github", "good-code").await,
            Err(AuthError::AccountBlocked)
        ));
    }

    #[tokio::test]
    async fn remote_login_end_to_end() {
        let (svc, clock) = service();
        let approver = svc
            .register("alice@example.com", "password123", None)
            .await
            .unwrap()
            .user;
        svc.link_remote_channel(approver.id, "chat-42").await.unwrap();

        let started = svc
            .start_remote_login(SessionType::RemoteDevice, "chat-42")
            .await
            .unwrap();
        let pending = svc.lookup_remote_login(approver.id, "chat-42").await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].request_id, started.request_id);

        clock.advance(Duration::seconds(10));
        svc.decide_remote_login(started.request_id, approver.id, true)
            .await
            .unwrap();
        clock.advance(Duration::seconds(10));
        assert_eq!(
            svc.poll_remote_login(&started.token).await.unwrap(),
            LoginStatus::Authorized
        );

        clock.advance(Duration::seconds(10));
        let pair = svc.consume_remote_login(&started.token).await.unwrap();
        assert_eq!(pair.user.id, approver.id);
        assert_eq!(
            svc.poll_remote_login(&started.token).await.unwrap(),
            LoginStatus::Expired
        );
        assert!(svc.consume_remote_login(&started.token).await.is_err());
    }

    #[tokio::test]
    async fn web_login_is_addressed_by_account_email() {
        let (svc, _) = service();
        let approver = svc
            .register("alice@example.com", "password123", None)
            .await
            .unwrap()
            .user;
        let started = svc
            .start_remote_login(SessionType::Web, "Alice@Example.com")
            .await
            .unwrap();
        let pending = svc
            .lookup_remote_login(approver.id, "Alice@Example.com")
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        svc.decide_remote_login(started.request_id, approver.id, true)
            .await
            .unwrap();
        let pair = svc.consume_remote_login(&started.token).await.unwrap();
        assert_eq!(pair.user.id, approver.id);
    }

    #[tokio::test]
    async fn foreign_requests_cannot_be_listed_or_decided() {
        let (svc, _) = service();
        let victim = svc
            .register("victim@example.com", "password123", None)
            .await
            .unwrap()
            .user;
        let mallory = svc
            .register("mallory@example.com", "password123", None)
            .await
            .unwrap()
            .user;
        svc.link_remote_channel(victim.id, "chat-42").await.unwrap();
        let started = svc
            .start_remote_login(SessionType::RemoteDevice, "chat-42")
            .await
            .unwrap();

        assert!(matches!(
            svc.lookup_remote_login(mallory.id, "chat-42").await,
            Err(AuthError::Forbidden(_))
        ));
        assert!(matches!(
            svc.decide_remote_login(started.request_id, mallory.id, true).await,
            Err(AuthError::Forbidden(_))
        ));
        // Someone else's chat cannot be claimed either.
        assert!(matches!(
            svc.link_remote_channel(mallory.id, "chat-42").await,
            Err(AuthError::DuplicateKey(_))
        ));
        assert_eq!(
            svc.poll_remote_login(&started.token).await.unwrap(),
            LoginStatus::Pending
        );
    }

    #[tokio::test]
    async fn unknown_request_handle_is_expired() {
        let (svc, _) = service();
        let approver = svc
            .register("alice@example.com", "password123", None)
            .await
            .unwrap()
            .user;
        assert!(matches!(
            svc.decide_remote_login(Uuid::new_v4(), approver.id, true).await,
            Err(AuthError::Expired)
        ));
    }

    #[tokio::test]
    async fn denied_remote_login_cannot_be_consumed() {
        let (svc, _) = service();
        let approver = svc
            .register("alice@example.com", "password123", None)
            .await
            .unwrap()
            .user;
        let started = svc
            .start_remote_login(SessionType::Web, "alice@example.com")
            .await
            .unwrap();
        svc.decide_remote_login(started.request_id, approver.id, false)
            .await
            .unwrap();
        assert_eq!(
            svc.poll_remote_login(&started.token).await.unwrap(),
            LoginStatus::Denied
        );
        assert!(matches!(
            svc.consume_remote_login(&started.token).await,
            Err(AuthError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn blocked_approver_cannot_authorize() {
        let (svc, _) = service();
        let approver = svc
            .register("alice@example.com", "password123", None)
            .await
            .unwrap()
            .user;
        svc.block(approver.id).await.unwrap();
        let started = svc
            .start_remote_login(SessionType::Web, "alice@example.com")
            .await
            .unwrap();
        assert!(matches!(
            svc.decide_remote_login(started.request_id, approver.id, true).await,
            Err(AuthError::AccountBlocked)
        ));
        assert_eq!(
            svc.poll_remote_login(&started.token).await.unwrap(),
            LoginStatus::Pending
        );
    }

    #[tokio::test]
    async fn permissions_follow_role_changes() {
        let (svc, _) = service();
        let user = svc
            .register("alice@example.com", "password123", None)
            .await
            .unwrap()
            .user;
        svc.set_roles(user.id, &["admin".into(), "wizard".into()])
            .await
            .unwrap();
        assert_eq!(svc.get_permissions(user.id).await.unwrap(), vec!["admin:*"]);
        assert!(matches!(
            svc.get_permissions(Uuid::now_v7()).await,
            Err(AuthError::NotFound(_))
        ));
    }
}
