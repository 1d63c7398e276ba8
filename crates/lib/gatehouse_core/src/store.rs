//! Deadline and retry wrapper used by the backing-store adapters.
//!
//! Every store call is bounded by [`StoreOptions::op_timeout`]. A call that
//! fails with a transient error is retried exactly once after
//! [`StoreOptions::retry_backoff`]; protocol logic above the adapters never
//! retries on its own.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::auth::AuthError;
use crate::config::StoreOptions;

/// Run `call` under the deadline, retrying once on a transient failure.
///
/// Only use for idempotent statements.
pub async fn bounded<T, F, Fut>(opts: StoreOptions, op: &'static str, mut call: F) -> Result<T, AuthError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AuthError>>,
{
    match with_deadline(opts.op_timeout, op, call()).await {
        Err(e) if e.is_transient() => {
            warn!(op, error = %e, "transient store failure, retrying once");
            tokio::time::sleep(opts.retry_backoff).await;
            with_deadline(opts.op_timeout, op, call()).await
        }
        other => other,
    }
}

/// Run `fut` under a deadline; elapsing surfaces as [`AuthError::Unavailable`].
pub async fn with_deadline<T, Fut>(deadline: Duration, op: &'static str, fut: Fut) -> Result<T, AuthError>
where
    Fut: Future<Output = Result<T, AuthError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(AuthError::Unavailable(format!("{op} exceeded {deadline:?}"))),
    }
}
