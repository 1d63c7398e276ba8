//! In-memory TTL store for login tokens.
//!
//! Entries past `expires_at` stay readable until
//! [`LoginTokenStore::purge_expired`] drops them, the same as the Postgres
//! store between eviction runs. Conditional updates run under the DashMap
//! shard lock, so check-and-set is atomic per key.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use super::LoginTokenStore;
use crate::auth::AuthError;
use crate::clock::{SharedClock, system_clock};
use crate::models::login_token::{Decision, LoginStatus, LoginToken};

/// In-memory [`LoginTokenStore`] keyed by token.
pub struct MemoryLoginTokenStore {
    tokens: DashMap<String, LoginToken>,
    clock: SharedClock,
}

impl MemoryLoginTokenStore {
    pub fn new() -> Self {
        Self::with_clock(system_clock())
    }

    pub fn with_clock(clock: SharedClock) -> Self {
        Self {
            tokens: DashMap::new(),
            clock,
        }
    }

    /// Number of stored records, expired or not.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Default for MemoryLoginTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LoginTokenStore for MemoryLoginTokenStore {
    async fn put(&self, record: &LoginToken) -> Result<(), AuthError> {
        match self.tokens.entry(record.token.clone()) {
            Entry::Occupied(_) => Err(AuthError::DuplicateKey(format!(
                "login token {} already stored",
                record.token
            ))),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }

    async fn get(&self, token: &str) -> Result<Option<LoginToken>, AuthError> {
        Ok(self.tokens.get(token).map(|entry| entry.value().clone()))
    }

    async fn find_by_request_id(&self, request_id: Uuid) -> Result<Option<LoginToken>, AuthError> {
        Ok(self
            .tokens
            .iter()
            .find(|entry| entry.request_id == request_id)
            .map(|entry| entry.value().clone()))
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Vec<LoginToken>, AuthError> {
        let now = self.clock.now();
        let mut found: Vec<LoginToken> = self
            .tokens
            .iter()
            .filter(|entry| entry.identifier == identifier && !entry.is_expired_at(now))
            .map(|entry| entry.value().clone())
            .collect();
        found.sort_by_key(|t| t.created_at);
        Ok(found)
    }

    async fn decide_if_pending(
        &self,
        token: &str,
        decision: Decision,
        now: DateTime<Utc>,
    ) -> Result<Option<LoginToken>, AuthError> {
        let Some(mut entry) = self.tokens.get_mut(token) else {
            return Ok(None);
        };
        if !entry.is_pending() || entry.is_expired_at(now) {
            return Ok(None);
        }
        entry.status = decision.status();
        entry.user_id = decision.user_id();
        entry.updated_at = now;
        Ok(Some(entry.value().clone()))
    }

    async fn take_authorized(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<LoginToken>, AuthError> {
        Ok(self
            .tokens
            .remove_if(token, |_, v| {
                v.status == LoginStatus::Authorized && !v.is_expired_at(now)
            })
            .map(|(_, v)| v))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let before = self.tokens.len();
        self.tokens.retain(|_, v| !v.is_expired_at(now));
        Ok(before.saturating_sub(self.tokens.len()) as u64)
    }
}
