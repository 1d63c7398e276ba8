//! API server configuration.

use std::time::Duration;

use gatehouse_core::auth::jwt::resolve_jwt_secret;
use gatehouse_core::config::{
    AuthConfig, DEFAULT_ACCESS_TTL_SECS, DEFAULT_PASSWORD_COST, DEFAULT_REFRESH_TTL_SECS,
    DEFAULT_STORE_TIMEOUT,
};
use gatehouse_core::oauth::{HttpOAuthExchange, OAuthClient};
use gatehouse_core::providers::{PROVIDER_GITHUB, PROVIDER_YANDEX};
use tracing::warn;

pub const DEFAULT_RATE_LIMIT_REQUESTS: u32 = 100;
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3100").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub pg_connection_url: String,
    /// JWT signing secret.
    pub jwt_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
    /// bcrypt cost for new password hashes.
    pub password_cost: u32,
    /// Deadline for a single backing-store call.
    pub store_timeout: Duration,
    /// Allowed CORS origins; empty allows any origin.
    pub cors_allowed_origins: Vec<String>,
    /// Requests a client may make to the public routes per window; 0 disables.
    pub rate_limit_requests: u32,
    pub rate_limit_window: Duration,
    pub github: Option<OAuthClient>,
    pub yandex: Option<OAuthClient>,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                  | Default                                   |
    /// |---------------------------|-------------------------------------------|
    /// | `BIND_ADDR`               | `127.0.0.1:3100`                          |
    /// | `DATABASE_URL`            | `postgres://localhost:5432/gatehouse`     |
    /// | `JWT_SECRET` / `AUTH_SECRET` | generated & persisted to file          |
    /// | `JWT_ACCESS_EXPIRE_SECS`  | `900`                                     |
    /// | `JWT_REFRESH_EXPIRE_SECS` | `604800`                                  |
    /// | `BCRYPT_COST`             | `10`                                      |
    /// | `STORE_TIMEOUT_MS`        | `5000`                                    |
    /// | `CORS_ALLOWED_ORIGINS`    | any                                       |
    /// | `RATE_LIMIT_REQUESTS`     | `100` (`0` disables)                      |
    /// | `RATE_LIMIT_WINDOW_SECS`  | `60`                                      |
    /// | `GITHUB_CLIENT_ID` / `GITHUB_CLIENT_SECRET` | GitHub login disabled   |
    /// | `YANDEX_CLIENT_ID` / `YANDEX_CLIENT_SECRET` | Yandex login disabled   |
    pub fn from_env() -> Self {
        let store_timeout_ms = env_or("STORE_TIMEOUT_MS", 5_000u64);
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3100".into()),
            pg_connection_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/gatehouse".into()),
            jwt_secret: resolve_jwt_secret(),
            access_ttl_secs: env_or("JWT_ACCESS_EXPIRE_SECS", DEFAULT_ACCESS_TTL_SECS),
            refresh_ttl_secs: env_or("JWT_REFRESH_EXPIRE_SECS", DEFAULT_REFRESH_TTL_SECS),
            password_cost: env_or("BCRYPT_COST", DEFAULT_PASSWORD_COST),
            store_timeout: Duration::from_millis(store_timeout_ms),
            cors_allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                .map(|v| parse_origins(&v))
                .unwrap_or_default(),
            rate_limit_requests: env_or("RATE_LIMIT_REQUESTS", DEFAULT_RATE_LIMIT_REQUESTS),
            rate_limit_window: Duration::from_secs(
                env_or("RATE_LIMIT_WINDOW_SECS", DEFAULT_RATE_LIMIT_WINDOW_SECS).max(1),
            ),
            github: oauth_client("GITHUB"),
            yandex: oauth_client("YANDEX"),
        }
    }

    /// Configuration for tests and local tooling: fixed secret, defaults
    /// everywhere else, no OAuth providers.
    pub fn for_secret(jwt_secret: &str) -> Self {
        Self {
            bind_addr: "127.0.0.1:0".into(),
            pg_connection_url: String::new(),
            jwt_secret: jwt_secret.into(),
            access_ttl_secs: DEFAULT_ACCESS_TTL_SECS,
            refresh_ttl_secs: DEFAULT_REFRESH_TTL_SECS,
            password_cost: DEFAULT_PASSWORD_COST,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            cors_allowed_origins: Vec::new(),
            rate_limit_requests: DEFAULT_RATE_LIMIT_REQUESTS,
            rate_limit_window: Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECS),
            github: None,
            yandex: None,
        }
    }

    /// Core settings derived from this configuration.
    pub fn auth_config(&self) -> AuthConfig {
        let mut config = AuthConfig {
            access_ttl_secs: self.access_ttl_secs,
            refresh_ttl_secs: self.refresh_ttl_secs,
            password_cost: self.password_cost,
            ..AuthConfig::default()
        };
        config.store.op_timeout = self.store_timeout;
        config
    }

    /// OAuth exchange with every configured provider registered.
    pub fn oauth_exchange(&self) -> HttpOAuthExchange {
        let mut exchange = HttpOAuthExchange::new();
        if let Some(client) = &self.github {
            exchange = exchange.with_client(PROVIDER_GITHUB, client.clone());
        }
        if let Some(client) = &self.yandex {
            exchange = exchange.with_client(PROVIDER_YANDEX, client.clone());
        }
        exchange
    }
}

fn env_or<T: std::str::FromStr>(var: &str, default: T) -> T {
    match std::env::var(var) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(var, value = %raw, "ignoring unparsable setting");
            default
        }),
        Err(_) => default,
    }
}

fn oauth_client(prefix: &str) -> Option<OAuthClient> {
    let client_id = std::env::var(format!("{prefix}_CLIENT_ID")).ok()?;
    let client_secret = std::env::var(format!("{prefix}_CLIENT_SECRET")).ok()?;
    if client_id.is_empty() || client_secret.is_empty() {
        return None;
    }
    Some(OAuthClient {
        client_id,
        client_secret,
    })
}

/// Split a comma-separated origin list.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}
