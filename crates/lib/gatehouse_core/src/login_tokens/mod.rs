//! Login token store contract, backends and the login session protocol.
//!
//! The store is a TTL-backed key → record map. Records past `expires_at`
//! stay readable until evicted; the protocol in [`session`] judges expiry
//! itself and never relies on eviction happening synchronously.

pub mod memory;
pub mod postgres;
pub mod session;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::AuthError;
use crate::clock::SharedClock;
use crate::models::login_token::{Decision, LoginToken};

pub use memory::MemoryLoginTokenStore;
pub use postgres::PgLoginTokenStore;
pub use session::LoginSessions;

/// Short-lived, keyed session-handoff records.
#[async_trait]
pub trait LoginTokenStore: Send + Sync {
    /// Insert a new record; it expires at `record.expires_at`.
    async fn put(&self, record: &LoginToken) -> Result<(), AuthError>;

    async fn get(&self, token: &str) -> Result<Option<LoginToken>, AuthError>;

    /// Look a record up by its public request handle.
    async fn find_by_request_id(&self, request_id: Uuid) -> Result<Option<LoginToken>, AuthError>;

    /// All live records carrying `identifier`, in creation order.
    async fn find_by_identifier(&self, identifier: &str) -> Result<Vec<LoginToken>, AuthError>;

    /// Check-and-set: apply `decision` only if the record is still pending
    /// and not expired at `now`. `None` when the condition did not hold.
    async fn decide_if_pending(
        &self,
        token: &str,
        decision: Decision,
        now: DateTime<Utc>,
    ) -> Result<Option<LoginToken>, AuthError>;

    /// Atomically delete and return the record if it is authorized and not
    /// expired at `now`.
    async fn take_authorized(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<LoginToken>, AuthError>;

    /// Evict every record expired at `now`. Returns how many were dropped.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError>;
}

/// Spawn a periodic eviction task; stops when `cancel` fires.
pub fn spawn_eviction_task(
    store: Arc<dyn LoginTokenStore>,
    clock: SharedClock,
    every: Duration,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    match store.purge_expired(clock.now()).await {
                        Ok(0) => {}
                        Ok(n) => debug!(evicted = n, "evicted expired login tokens"),
                        Err(e) => warn!(error = %e, "login token eviction failed"),
                    }
                }
            }
        }
    })
}
