//! Per-client sliding-window rate limiting for the public routes.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use dashmap::DashMap;
use tracing::warn;

use crate::AppState;
use crate::error::AppError;

/// How often idle clients are dropped from the map.
const SWEEP_INTERVAL_SECS: u64 = 300;

/// Counts requests per client key over a sliding window.
#[derive(Debug)]
pub struct RateLimiter {
    limit_per_window: u32,
    window: Duration,
    started: Instant,
    last_sweep_secs: AtomicU64,
    requests: DashMap<String, Vec<Instant>>,
}

impl RateLimiter {
    /// A limit of zero disables limiting.
    pub fn new(limit_per_window: u32, window: Duration) -> Self {
        Self {
            limit_per_window,
            window,
            started: Instant::now(),
            last_sweep_secs: AtomicU64::new(0),
            requests: DashMap::new(),
        }
    }

    /// Record a request from `key`; false once the window is full.
    pub fn allow(&self, key: &str) -> bool {
        if self.limit_per_window == 0 {
            return true;
        }

        let now = Instant::now();
        let cutoff = now.checked_sub(self.window);
        self.sweep(now, cutoff);

        let mut entry = self.requests.entry(key.to_owned()).or_default();
        if let Some(cutoff) = cutoff {
            entry.retain(|t| *t > cutoff);
        }
        if entry.len() >= self.limit_per_window as usize {
            return false;
        }
        entry.push(now);
        true
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.requests.len()
    }

    fn sweep(&self, now: Instant, cutoff: Option<Instant>) {
        let elapsed = now.duration_since(self.started).as_secs();
        let last = self.last_sweep_secs.load(Ordering::Relaxed);
        if elapsed.saturating_sub(last) < SWEEP_INTERVAL_SECS {
            return;
        }
        // One caller per interval does the sweep.
        if self
            .last_sweep_secs
            .compare_exchange(last, elapsed, Ordering::Relaxed, Ordering::Relaxed)
            .is_err()
        {
            return;
        }
        self.requests.retain(|_, timestamps| {
            if let Some(cutoff) = cutoff {
                timestamps.retain(|t| *t > cutoff);
            }
            !timestamps.is_empty()
        });
    }
}

/// First address in `X-Forwarded-For` or `X-Real-IP`.
pub fn client_key_from_headers(headers: &HeaderMap) -> Option<String> {
    ["X-Forwarded-For", "X-Real-IP"].into_iter().find_map(|name| {
        let value = headers.get(name)?.to_str().ok()?;
        let first = value.split(',').next()?.trim();
        (!first.is_empty()).then(|| first.to_owned())
    })
}

fn client_key(request: &Request) -> String {
    client_key_from_headers(request.headers())
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".into())
}

/// Axum middleware: rejects a client with 429 once it exceeds the
/// configured requests per window.
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = client_key(&request);
    if !state.rate_limiter.allow(&key) {
        warn!(client = %key, "rate limit exceeded");
        return Err(AppError::TooManyRequests);
    }
    Ok(next.run(request).await)
}
