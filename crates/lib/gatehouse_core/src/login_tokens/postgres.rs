//! Postgres-backed login token store.
//!
//! Uses an UNLOGGED table. Rows past `expires_at` are removed by
//! [`LoginTokenStore::purge_expired`], driven by
//! [`spawn_eviction_task`](super::spawn_eviction_task).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::LoginTokenStore;
use crate::auth::AuthError;
use crate::config::StoreOptions;
use crate::models::login_token::{Decision, LoginStatus, LoginToken};
use crate::store::{bounded, with_deadline};

const TOKEN_COLUMNS: &str = "token, request_id, session_type, identifier, status, user_id, \
     created_at, expires_at, updated_at";

#[derive(sqlx::FromRow)]
struct LoginTokenRow {
    token: String,
    request_id: Uuid,
    session_type: String,
    identifier: String,
    status: String,
    user_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LoginTokenRow> for LoginToken {
    type Error = AuthError;

    fn try_from(row: LoginTokenRow) -> Result<Self, Self::Error> {
        Ok(LoginToken {
            token: row.token,
            request_id: row.request_id,
            session_type: row
                .session_type
                .parse()
                .map_err(|e| AuthError::Internal(format!("stored login token: {e}")))?,
            identifier: row.identifier,
            status: row
                .status
                .parse()
                .map_err(|e| AuthError::Internal(format!("stored login token: {e}")))?,
            user_id: row.user_id,
            created_at: row.created_at,
            expires_at: row.expires_at,
            updated_at: row.updated_at,
        })
    }
}

fn convert(row: Option<LoginTokenRow>) -> Result<Option<LoginToken>, AuthError> {
    row.map(LoginToken::try_from).transpose()
}

/// Postgres [`LoginTokenStore`].
#[derive(Clone)]
pub struct PgLoginTokenStore {
    pool: PgPool,
    opts: StoreOptions,
}

impl PgLoginTokenStore {
    pub fn new(pool: PgPool, opts: StoreOptions) -> Self {
        Self { pool, opts }
    }
}

#[async_trait]
impl LoginTokenStore for PgLoginTokenStore {
    async fn put(&self, record: &LoginToken) -> Result<(), AuthError> {
        let insert = sqlx::query(
            "INSERT INTO login_tokens \
             (token, request_id, session_type, identifier, status, user_id, created_at, \
             expires_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(&record.token)
        .bind(record.request_id)
        .bind(record.session_type.as_str())
        .bind(&record.identifier)
        .bind(record.status.as_str())
        .bind(record.user_id)
        .bind(record.created_at)
        .bind(record.expires_at)
        .bind(record.updated_at)
        .execute(&self.pool);
        with_deadline(self.opts.op_timeout, "login_tokens.put", async {
            insert.await?;
            Ok(())
        })
        .await
    }

    async fn get(&self, token: &str) -> Result<Option<LoginToken>, AuthError> {
        let pool = &self.pool;
        let sql = format!("SELECT {TOKEN_COLUMNS} FROM login_tokens WHERE token = $1");
        let sql = sql.as_str();
        let row = bounded(self.opts, "login_tokens.get", move || async move {
            Ok::<_, AuthError>(
                sqlx::query_as::<_, LoginTokenRow>(sql)
                    .bind(token)
                    .fetch_optional(pool)
                    .await?,
            )
        })
        .await?;
        convert(row)
    }

    async fn find_by_request_id(&self, request_id: Uuid) -> Result<Option<LoginToken>, AuthError> {
        let pool = &self.pool;
        let sql = format!("SELECT {TOKEN_COLUMNS} FROM login_tokens WHERE request_id = $1");
        let sql = sql.as_str();
        let row = bounded(self.opts, "login_tokens.find_by_request_id", move || async move {
            Ok::<_, AuthError>(
                sqlx::query_as::<_, LoginTokenRow>(sql)
                    .bind(request_id)
                    .fetch_optional(pool)
                    .await?,
            )
        })
        .await?;
        convert(row)
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Vec<LoginToken>, AuthError> {
        let pool = &self.pool;
        let sql = format!(
            "SELECT {TOKEN_COLUMNS} FROM login_tokens \
             WHERE identifier = $1 AND expires_at >= now() \
             ORDER BY created_at"
        );
        let sql = sql.as_str();
        let rows = bounded(self.opts, "login_tokens.find_by_identifier", move || async move {
            Ok::<_, AuthError>(
                sqlx::query_as::<_, LoginTokenRow>(sql)
                    .bind(identifier)
                    .fetch_all(pool)
                    .await?,
            )
        })
        .await?;
        rows.into_iter().map(LoginToken::try_from).collect()
    }

    async fn decide_if_pending(
        &self,
        token: &str,
        decision: Decision,
        now: DateTime<Utc>,
    ) -> Result<Option<LoginToken>, AuthError> {
        let sql = format!(
            "UPDATE login_tokens SET status = $2, user_id = $3, updated_at = $4 \
             WHERE token = $1 AND status = 'pending' AND expires_at >= $4 \
             RETURNING {TOKEN_COLUMNS}"
        );
        // Conditional and not idempotent: never retried.
        let row = with_deadline(self.opts.op_timeout, "login_tokens.decide", async {
            Ok(sqlx::query_as::<_, LoginTokenRow>(&sql)
                .bind(token)
                .bind(decision.status().as_str())
                .bind(decision.user_id())
                .bind(now)
                .fetch_optional(&self.pool)
                .await?)
        })
        .await?;
        convert(row)
    }

    async fn take_authorized(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<LoginToken>, AuthError> {
        let sql = format!(
            "DELETE FROM login_tokens \
             WHERE token = $1 AND status = $2 AND expires_at >= $3 \
             RETURNING {TOKEN_COLUMNS}"
        );
        let row = with_deadline(self.opts.op_timeout, "login_tokens.take", async {
            Ok(sqlx::query_as::<_, LoginTokenRow>(&sql)
                .bind(token)
                .bind(LoginStatus::Authorized.as_str())
                .bind(now)
                .fetch_optional(&self.pool)
                .await?)
        })
        .await?;
        convert(row)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let pool = &self.pool;
        bounded(self.opts, "login_tokens.purge_expired", move || async move {
            Ok::<_, AuthError>(
                sqlx::query("DELETE FROM login_tokens WHERE expires_at < $1")
                    .bind(now)
                    .execute(pool)
                    .await?
                    .rows_affected(),
            )
        })
        .await
    }
}
