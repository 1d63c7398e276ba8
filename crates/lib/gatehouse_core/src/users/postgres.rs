//! Postgres-backed user store.
//!
//! The `users` table keeps the document shape: `roles` and `refresh_tokens`
//! are `TEXT[]` mutated with single atomic statements, `external_auth` is a
//! `JSONB` document looked up by containment on the provider's field path.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use super::{UserStore, ensure_roles, user_not_found};
use crate::auth::AuthError;
use crate::config::StoreOptions;
use crate::models::user::{ExternalAuthBinding, User};
use crate::providers::{ExternalAuthProvider, NamedProvider};
use crate::store::{bounded, with_deadline};

const USER_COLUMNS: &str = "id, email, full_name, password_hash, roles, refresh_tokens, \
     is_blocked, external_auth, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    full_name: String,
    password_hash: Option<String>,
    roles: Vec<String>,
    refresh_tokens: Vec<String>,
    is_blocked: bool,
    external_auth: Json<BTreeMap<String, ExternalAuthBinding>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            password_hash: row.password_hash,
            roles: row.roles,
            refresh_tokens: row.refresh_tokens,
            is_blocked: row.is_blocked,
            external_auth: row.external_auth.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Build the containment document `{"a": {"b": id}}` for a field path.
fn containment_doc(path: &[String], external_id: &str) -> Value {
    path.iter()
        .rev()
        .fold(Value::String(external_id.to_string()), |inner, key| {
            let mut obj = Map::new();
            obj.insert(key.clone(), inner);
            Value::Object(obj)
        })
}

/// Postgres [`UserStore`].
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
    opts: StoreOptions,
}

impl PgUserStore {
    pub fn new(pool: PgPool, opts: StoreOptions) -> Self {
        Self { pool, opts }
    }

    /// Serialize binding claims: take an advisory lock per binding and make
    /// sure no other user holds it. Runs inside the writing transaction.
    async fn claim_bindings(
        tx: &mut Transaction<'_, Postgres>,
        user: &User,
    ) -> Result<(), AuthError> {
        for (provider, binding) in &user.external_auth {
            Self::claim_binding(tx, user.id, provider, &binding.id).await?;
        }
        Ok(())
    }

    async fn claim_binding(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        provider: &str,
        external_id: &str,
    ) -> Result<(), AuthError> {
        let lock_key = format!("external_auth:{provider}:{external_id}");
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(&lock_key)
            .execute(&mut **tx)
            .await?;

        let doc = containment_doc(&NamedProvider::new(provider).field_path(), external_id);
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id <> $1 AND external_auth @> $2)",
        )
        .bind(user_id)
        .bind(Json(doc))
        .fetch_one(&mut **tx)
        .await?;
        if taken {
            return Err(AuthError::DuplicateKey(format!(
                "{provider} account {external_id} already linked"
            )));
        }
        Ok(())
    }

    async fn insert(&self, user: &User) -> Result<User, AuthError> {
        let mut tx = self.pool.begin().await?;
        Self::claim_bindings(&mut tx, user).await?;
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (id, email, full_name, password_hash, roles, refresh_tokens, \
             is_blocked, external_auth, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now(), now()) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .bind(user.roles.clone())
        .bind(user.refresh_tokens.clone())
        .bind(user.is_blocked)
        .bind(Json(&user.external_auth))
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(row.into())
    }

    async fn replace(&self, user: &User) -> Result<User, AuthError> {
        let mut tx = self.pool.begin().await?;
        Self::claim_bindings(&mut tx, user).await?;
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET email = $2, full_name = $3, password_hash = $4, roles = $5, \
             external_auth = $6, updated_at = now() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .bind(user.roles.clone())
        .bind(Json(&user.external_auth))
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| user_not_found(user.id))?;
        tx.commit().await?;
        Ok(row.into())
    }

    async fn link(
        &self,
        user_id: Uuid,
        provider: &str,
        binding: &ExternalAuthBinding,
    ) -> Result<User, AuthError> {
        let mut tx = self.pool.begin().await?;
        Self::claim_binding(&mut tx, user_id, provider, &binding.id).await?;
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET external_auth = external_auth || jsonb_build_object($2::text, $3::jsonb), \
             updated_at = now() \
             WHERE id = $1 AND (NOT external_auth ? $2 OR external_auth -> $2 ->> 'id' = $4) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(provider)
        .bind(Json(binding))
        .bind(&binding.id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = row else {
            let exists =
                sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                    .bind(user_id)
                    .fetch_one(&mut *tx)
                    .await?;
            return Err(if exists {
                AuthError::ValidationError(format!(
                    "user already linked to a different {provider} account"
                ))
            } else {
                user_not_found(user_id)
            });
        };
        tx.commit().await?;
        Ok(row.into())
    }

    async fn exists(&self, user_id: Uuid) -> Result<bool, AuthError> {
        let pool = &self.pool;
        bounded(self.opts, "users.exists", move || async move {
            Ok::<_, AuthError>(
                sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                    .bind(user_id)
                    .fetch_one(pool)
                    .await?,
            )
        })
        .await
    }

    /// Run a single-row `UPDATE ... WHERE id = $1`, mapping zero rows to `NotFound`.
    async fn update_one(
        &self,
        op: &'static str,
        sql: &'static str,
        user_id: Uuid,
    ) -> Result<(), AuthError> {
        let pool = &self.pool;
        let affected = bounded(self.opts, op, move || async move {
            Ok::<_, AuthError>(sqlx::query(sql)
                .bind(user_id)
                .execute(pool)
                .await?
                .rows_affected())
        })
        .await?;
        if affected == 0 {
            return Err(user_not_found(user_id));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let pool = &self.pool;
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let sql = sql.as_str();
        let row = bounded(self.opts, "users.find_by_email", move || async move {
            Ok::<_, AuthError>(sqlx::query_as::<_, UserRow>(sql)
                .bind(email)
                .fetch_optional(pool)
                .await?)
        })
        .await?;
        Ok(row.map(User::from))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        let pool = &self.pool;
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let sql = sql.as_str();
        let row = bounded(self.opts, "users.find_by_id", move || async move {
            Ok::<_, AuthError>(sqlx::query_as::<_, UserRow>(sql)
                .bind(id)
                .fetch_optional(pool)
                .await?)
        })
        .await?;
        Ok(row.map(User::from))
    }

    async fn find_by_external_auth(
        &self,
        provider: &dyn ExternalAuthProvider,
        external_id: &str,
    ) -> Result<Option<User>, AuthError> {
        let pool = &self.pool;
        let doc = containment_doc(&provider.field_path(), external_id);
        let doc = &doc;
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE external_auth @> $1 LIMIT 1");
        let sql = sql.as_str();
        debug!(provider = provider.name(), "looking up user by external auth");
        let row = bounded(self.opts, "users.find_by_external_auth", move || async move {
            Ok::<_, AuthError>(sqlx::query_as::<_, UserRow>(sql)
                .bind(Json(doc))
                .fetch_optional(pool)
                .await?)
        })
        .await?;
        Ok(row.map(User::from))
    }

    async fn create(&self, mut user: User) -> Result<User, AuthError> {
        user.validate()?;
        user.id = Uuid::now_v7();
        // Not idempotent: deadline only, no retry.
        with_deadline(self.opts.op_timeout, "users.create", self.insert(&user)).await
    }

    async fn update(&self, user: User) -> Result<User, AuthError> {
        user.validate()?;
        with_deadline(self.opts.op_timeout, "users.update", self.replace(&user)).await
    }

    async fn bind_external_auth(
        &self,
        user_id: Uuid,
        provider: &str,
        binding: ExternalAuthBinding,
    ) -> Result<User, AuthError> {
        let linked = self.link(user_id, provider, &binding);
        with_deadline(self.opts.op_timeout, "users.bind_external_auth", linked).await
    }

    async fn add_refresh_token(&self, user_id: Uuid, token: &str) -> Result<(), AuthError> {
        let pool = &self.pool;
        let affected = bounded(self.opts, "users.add_refresh_token", move || async move {
            Ok::<_, AuthError>(sqlx::query(
                "UPDATE users SET refresh_tokens = CASE \
                     WHEN $2 = ANY(refresh_tokens) THEN refresh_tokens \
                     ELSE array_append(refresh_tokens, $2) END, \
                 updated_at = now() \
                 WHERE id = $1",
            )
            .bind(user_id)
            .bind(token)
            .execute(pool)
            .await?
            .rows_affected())
        })
        .await?;
        if affected == 0 {
            return Err(user_not_found(user_id));
        }
        Ok(())
    }

    async fn remove_refresh_token(&self, user_id: Uuid, token: &str) -> Result<bool, AuthError> {
        let pool = &self.pool;
        let affected = bounded(self.opts, "users.remove_refresh_token", move || async move {
            Ok::<_, AuthError>(sqlx::query(
                "UPDATE users SET refresh_tokens = array_remove(refresh_tokens, $2), \
                 updated_at = now() \
                 WHERE id = $1 AND $2 = ANY(refresh_tokens)",
            )
            .bind(user_id)
            .bind(token)
            .execute(pool)
            .await?
            .rows_affected())
        })
        .await?;
        if affected > 0 {
            return Ok(true);
        }
        if self.exists(user_id).await? {
            Ok(false)
        } else {
            Err(user_not_found(user_id))
        }
    }

    async fn remove_all_refresh_tokens(&self, user_id: Uuid) -> Result<(), AuthError> {
        self.update_one(
            "users.remove_all_refresh_tokens",
            "UPDATE users SET refresh_tokens = '{}', updated_at = now() WHERE id = $1",
            user_id,
        )
        .await
    }

    async fn block(&self, user_id: Uuid) -> Result<(), AuthError> {
        self.update_one(
            "users.block",
            "UPDATE users SET is_blocked = TRUE, updated_at = now() WHERE id = $1",
            user_id,
        )
        .await
    }

    async fn unblock(&self, user_id: Uuid) -> Result<(), AuthError> {
        self.update_one(
            "users.unblock",
            "UPDATE users SET is_blocked = FALSE, updated_at = now() WHERE id = $1",
            user_id,
        )
        .await
    }

    async fn set_roles(&self, user_id: Uuid, roles: &[String]) -> Result<(), AuthError> {
        ensure_roles(roles)?;
        let pool = &self.pool;
        let affected = bounded(self.opts, "users.set_roles", move || async move {
            Ok::<_, AuthError>(sqlx::query("UPDATE users SET roles = $2, updated_at = now() WHERE id = $1")
                .bind(user_id)
                .bind(roles.to_vec())
                .execute(pool)
                .await?
                .rows_affected())
        })
        .await?;
        if affected == 0 {
            return Err(user_not_found(user_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment_doc_nests_along_path() {
        let doc = containment_doc(&["github".to_string(), "id".to_string()], "42");
        assert_eq!(doc, serde_json::json!({ "github": { "id": "42" } }));
    }

    /// Runs against a real database only when `DATABASE_URL` is set.
    #[tokio::test]
    async fn pg_store_roundtrip_when_database_available() {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            return;
        };
        let pool = PgPool::connect(&url).await.expect("connect");
        crate::migrate::migrate(&pool).await.expect("migrate");
        let store = PgUserStore::new(pool, StoreOptions::default());

        let email = format!("pg-{}@example.com", Uuid::now_v7().simple());
        let user = store.create(User::new(&email, "Pg User")).await.unwrap();
        assert!(matches!(
            store.create(User::new(&email, "Again")).await,
            Err(AuthError::DuplicateKey(_))
        ));

        store.add_refresh_token(user.id, "rt1").await.unwrap();
        assert!(store.remove_refresh_token(user.id, "rt1").await.unwrap());
        assert!(!store.remove_refresh_token(user.id, "rt1").await.unwrap());

        store.add_refresh_token(user.id, "rt2").await.unwrap();
        store.block(user.id).await.unwrap();
        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert!(stored.is_blocked);
        assert_eq!(stored.created_at, user.created_at);

        let external_id = Uuid::now_v7().simple().to_string();
        let linked = store
            .bind_external_auth(
                user.id,
                "github",
                ExternalAuthBinding {
                    id: external_id.clone(),
                    email: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(linked.external_id("github"), Some(external_id.as_str()));
        assert_eq!(linked.refresh_tokens, vec!["rt2"]);
        assert!(linked.is_blocked);

        // A stale document must not resurrect tokens or lift the block.
        let mut stale = user.clone();
        stale.full_name = "Renamed".into();
        stale.external_auth = linked.external_auth.clone();
        let updated = store.update(stale).await.unwrap();
        assert_eq!(updated.refresh_tokens, vec!["rt2"]);
        assert!(updated.is_blocked);
    }
}
