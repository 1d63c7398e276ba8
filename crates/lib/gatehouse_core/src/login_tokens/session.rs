//! Cross-device login session protocol.
//!
//! Device A starts a session and polls its token; an already authenticated
//! channel finds the pending request by identifier and decides it; device A
//! then consumes the authorized token exactly once.
//!
//! ```text
//! pending ──decide──▶ authorized ──consume──▶ (deleted)
//!    │      └───────▶ denied
//!    └──── ttl ─────▶ expired
//! ```

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use super::LoginTokenStore;
use crate::auth::AuthError;
use crate::clock::SharedClock;
use crate::models::login_token::{Decision, LoginStatus, LoginToken, SessionType};

/// The login session state machine over a [`LoginTokenStore`].
#[derive(Clone)]
pub struct LoginSessions {
    store: Arc<dyn LoginTokenStore>,
    clock: SharedClock,
    ttl: Duration,
}

impl LoginSessions {
    pub fn new(store: Arc<dyn LoginTokenStore>, clock: SharedClock, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a pending session for `identifier`.
    pub async fn create(
        &self,
        session_type: SessionType,
        identifier: &str,
    ) -> Result<LoginToken, AuthError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(AuthError::ValidationError(
                "login identifier must not be empty".into(),
            ));
        }
        let record = LoginToken::new(session_type, identifier, self.clock.now(), self.ttl);
        self.store.put(&record).await?;
        debug!(%session_type, identifier, "login session started");
        Ok(record)
    }

    /// Pending, unexpired sessions waiting on `identifier`.
    pub async fn lookup_by_identifier(&self, identifier: &str) -> Result<Vec<LoginToken>, AuthError> {
        let now = self.clock.now();
        Ok(self
            .store
            .find_by_identifier(identifier)
            .await?
            .into_iter()
            .filter(|t| t.effective_status(now) == LoginStatus::Pending)
            .collect())
    }

    /// The record behind a public request handle, whatever its status.
    pub async fn find_request(&self, request_id: Uuid) -> Result<Option<LoginToken>, AuthError> {
        self.store.find_by_request_id(request_id).await
    }

    /// Apply the authorizing side's verdict. Only the first decision on a
    /// pending token wins.
    pub async fn decide(&self, token: &str, decision: Decision) -> Result<LoginToken, AuthError> {
        let now = self.clock.now();
        if let Some(decided) = self.store.decide_if_pending(token, decision, now).await? {
            info!(status = %decided.status, "login session decided");
            return Ok(decided);
        }
        match self.store.get(token).await? {
            None => Err(AuthError::Expired),
            Some(current) if current.is_expired_at(now) => Err(AuthError::Expired),
            Some(current) => Err(AuthError::InvalidState(format!(
                "login token already {}",
                current.status
            ))),
        }
    }

    /// Current status for the originating device. Absent reads as expired.
    pub async fn poll(&self, token: &str) -> Result<LoginStatus, AuthError> {
        let now = self.clock.now();
        Ok(self
            .store
            .get(token)
            .await?
            .map_or(LoginStatus::Expired, |t| t.effective_status(now)))
    }

    /// Redeem an authorized token once, returning the bound user.
    pub async fn consume(&self, token: &str) -> Result<Uuid, AuthError> {
        let now = self.clock.now();
        if let Some(taken) = self.store.take_authorized(token, now).await? {
            return taken.user_id.ok_or_else(|| {
                AuthError::Internal("authorized login token without a user".into())
            });
        }
        match self.store.get(token).await? {
            None => Err(AuthError::NotFound("login token".into())),
            Some(current) if current.status == LoginStatus::Authorized => {
                Err(AuthError::Expired)
            }
            Some(current) => Err(AuthError::InvalidState(format!(
                "login token is {}",
                current.effective_status(now)
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::clock::ManualClock;
    use crate::login_tokens::MemoryLoginTokenStore;

    fn sessions() -> (LoginSessions, ManualClock) {
        let clock = ManualClock::new(Utc::now());
        let shared: SharedClock = Arc::new(clock.clone());
        let store = Arc::new(MemoryLoginTokenStore::with_clock(shared.clone()));
        (
            LoginSessions::new(store, shared, Duration::minutes(5)),
            clock,
        )
    }

    #[tokio::test]
    async fn authorize_poll_consume_scenario() {
        let (sessions, clock) = sessions();
        let user = Uuid::now_v7();
        let token = sessions
            .create(SessionType::RemoteDevice, "chat-42")
            .await
            .unwrap()
            .token;

        clock.advance(Duration::seconds(10));
        let decided = sessions
            .decide(&token, Decision::Authorized(user))
            .await
            .unwrap();
        assert_eq!(decided.user_id, Some(user));

        clock.advance(Duration::seconds(10));
        assert_eq!(sessions.poll(&token).await.unwrap(), LoginStatus::Authorized);

        clock.advance(Duration::seconds(10));
        assert_eq!(sessions.consume(&token).await.unwrap(), user);
        assert_eq!(sessions.poll(&token).await.unwrap(), LoginStatus::Expired);
    }

    #[tokio::test]
    async fn authorized_token_expires_if_not_consumed_in_time() {
        let (sessions, clock) = sessions();
        let user = Uuid::now_v7();
        let token = sessions.create(SessionType::RemoteDevice, "chat-42").await.unwrap().token;
        sessions
            .decide(&token, Decision::Authorized(user))
            .await
            .unwrap();

        clock.advance(Duration::seconds(301));
        assert_eq!(sessions.poll(&token).await.unwrap(), LoginStatus::Expired);
        assert!(matches!(sessions.consume(&token).await, Err(AuthError::Expired)));
    }

    #[tokio::test]
    async fn request_handle_resolves_to_the_record() {
        let (sessions, _) = sessions();
        let started = sessions.create(SessionType::Web, "chat-42").await.unwrap();
        let found = sessions.find_request(started.request_id).await.unwrap().unwrap();
        assert_eq!(found.token, started.token);
        assert!(sessions.find_request(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn undecided_token_expires() {
        let (sessions, clock) = sessions();
        let token = sessions.create(SessionType::Web, "chat-42").await.unwrap().token;
        clock.advance(Duration::seconds(300));
        assert_eq!(sessions.poll(&token).await.unwrap(), LoginStatus::Pending);
        clock.advance(Duration::seconds(1));
        assert_eq!(sessions.poll(&token).await.unwrap(), LoginStatus::Expired);
    }

    #[tokio::test]
    async fn unknown_token_polls_expired() {
        let (sessions, _) = sessions();
        assert_eq!(sessions.poll("nope").await.unwrap(), LoginStatus::Expired);
    }

    #[tokio::test]
    async fn second_decision_is_rejected() {
        let (sessions, _) = sessions();
        let user = Uuid::now_v7();
        let token = sessions.create(SessionType::Web, "chat-42").await.unwrap().token;
        sessions
            .decide(&token, Decision::Authorized(user))
            .await
            .unwrap();

        let err = sessions.decide(&token, Decision::Denied).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidState(_)));
        assert_eq!(sessions.poll(&token).await.unwrap(), LoginStatus::Authorized);
    }

    #[tokio::test]
    async fn decide_after_expiry_or_on_unknown_token_is_expired() {
        let (sessions, clock) = sessions();
        let token = sessions.create(SessionType::Web, "chat-42").await.unwrap().token;
        clock.advance(Duration::seconds(301));
        assert!(matches!(
            sessions.decide(&token, Decision::Denied).await,
            Err(AuthError::Expired)
        ));
        assert!(matches!(
            sessions.decide("missing", Decision::Denied).await,
            Err(AuthError::Expired)
        ));
    }

    #[tokio::test]
    async fn consume_is_single_use() {
        let (sessions, _) = sessions();
        let user = Uuid::now_v7();
        let token = sessions.create(SessionType::Web, "chat-42").await.unwrap().token;
        sessions
            .decide(&token, Decision::Authorized(user))
            .await
            .unwrap();
        assert_eq!(sessions.consume(&token).await.unwrap(), user);
        assert!(matches!(
            sessions.consume(&token).await,
            Err(AuthError::NotFound(_) | AuthError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn consume_requires_authorization() {
        let (sessions, _) = sessions();
        let pending = sessions.create(SessionType::Web, "chat-1").await.unwrap().token;
        assert!(matches!(
            sessions.consume(&pending).await,
            Err(AuthError::InvalidState(_))
        ));

        let denied = sessions.create(SessionType::Web, "chat-2").await.unwrap().token;
        sessions.decide(&denied, Decision::Denied).await.unwrap();
        assert!(matches!(
            sessions.consume(&denied).await,
            Err(AuthError::InvalidState(_))
        ));
        assert_eq!(sessions.poll(&denied).await.unwrap(), LoginStatus::Denied);
    }

    #[tokio::test]
    async fn lookup_returns_only_pending() {
        let (sessions, _) = sessions();
        let first = sessions.create(SessionType::RemoteDevice, "chat-7").await.unwrap();
        let second = sessions.create(SessionType::RemoteDevice, "chat-7").await.unwrap();
        sessions.create(SessionType::RemoteDevice, "chat-8").await.unwrap();
        sessions.decide(&first.token, Decision::Denied).await.unwrap();

        let pending = sessions.lookup_by_identifier("chat-7").await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].token, second.token);
    }

    #[tokio::test]
    async fn empty_identifier_is_rejected() {
        let (sessions, _) = sessions();
        assert!(matches!(
            sessions.create(SessionType::Web, "  ").await,
            Err(AuthError::ValidationError(_))
        ));
    }
}
