//! Core tuning knobs: credential lifetimes, login-token TTL, store deadlines.

use std::time::Duration;

/// Access token lifetime: 15 minutes.
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 15 * 60;

/// Refresh token lifetime: 7 days.
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Login token lifetime: 5 minutes.
pub const DEFAULT_LOGIN_TOKEN_TTL_SECS: i64 = 5 * 60;

/// Minimum accepted password length on registration.
pub const DEFAULT_MIN_PASSWORD_LEN: usize = 8;

/// bcrypt cost factor for new password hashes.
pub const DEFAULT_PASSWORD_COST: u32 = 10;

/// Per-call deadline for backing-store operations.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Backoff before the single retry of a transient store failure.
pub const DEFAULT_STORE_RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// Configuration for `AuthService` and the stores it drives.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
    pub login_token_ttl_secs: i64,
    pub min_password_len: usize,
    pub password_cost: u32,
    pub store: StoreOptions,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_ttl_secs: DEFAULT_ACCESS_TTL_SECS,
            refresh_ttl_secs: DEFAULT_REFRESH_TTL_SECS,
            login_token_ttl_secs: DEFAULT_LOGIN_TOKEN_TTL_SECS,
            min_password_len: DEFAULT_MIN_PASSWORD_LEN,
            password_cost: DEFAULT_PASSWORD_COST,
            store: StoreOptions::default(),
        }
    }
}

/// Deadline and retry policy applied by store adapters to every call.
#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
    /// Upper bound for one atomic store call.
    pub op_timeout: Duration,
    /// Sleep before retrying a transient failure once.
    pub retry_backoff: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            op_timeout: DEFAULT_STORE_TIMEOUT,
            retry_backoff: DEFAULT_STORE_RETRY_BACKOFF,
        }
    }
}
