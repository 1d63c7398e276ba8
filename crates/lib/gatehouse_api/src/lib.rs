//! # gatehouse_api
//!
//! HTTP API library for Gatehouse.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use gatehouse_core::AuthService;
use gatehouse_core::clock::SharedClock;
use gatehouse_core::login_tokens::LoginTokenStore;
use gatehouse_core::users::UserStore;
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::config::ApiConfig;
use crate::handlers::{admin, auth, health, oauth, remote_login};
use crate::middleware::rate_limit::RateLimiter;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AuthService>,
    /// API configuration.
    pub config: ApiConfig,
    /// Per-client limiter for the public routes.
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(service: Arc<AuthService>, config: ApiConfig) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(
            config.rate_limit_requests,
            config.rate_limit_window,
        ));
        Self {
            service,
            config,
            rate_limiter,
        }
    }

    /// Wire the auth service over the given stores, with OAuth providers
    /// taken from `config`.
    pub fn from_stores(
        config: ApiConfig,
        users: Arc<dyn UserStore>,
        login_tokens: Arc<dyn LoginTokenStore>,
        clock: SharedClock,
    ) -> Self {
        let service = AuthService::new(
            users,
            login_tokens,
            Arc::new(config.oauth_exchange()),
            config.jwt_secret.as_bytes(),
            config.auth_config(),
            clock,
        );
        Self::new(Arc::new(service), config)
    }
}

/// Run embedded database migrations.
///
/// Delegates to `gatehouse_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    gatehouse_core::migrate::migrate(pool).await
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);

    // Public routes (no auth required, rate limited per client)
    let public = Router::new()
        .route(routes::GET_HEALTH, get(health::health_handler))
        .route(routes::POST_AUTH_REGISTER, post(auth::register_handler))
        .route(routes::POST_AUTH_LOGIN, post(auth::login_handler))
        .route(routes::POST_AUTH_REFRESH, post(auth::refresh_handler))
        .route(
            routes::GET_AUTH_OAUTH_CALLBACK,
            get(oauth::oauth_callback_handler),
        )
        .route(routes::POST_AUTH_REMOTE, post(remote_login::start_handler))
        .route(routes::GET_AUTH_REMOTE_TOKEN, get(remote_login::poll_handler))
        .route(
            routes::POST_AUTH_REMOTE_TOKEN_CONSUME,
            post(remote_login::consume_handler),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::rate_limit,
        ));

    // Protected routes (require auth)
    let protected = Router::new()
        .route(routes::POST_AUTH_LOGOUT, post(auth::logout_handler))
        .route(routes::GET_AUTH_PERMISSIONS, get(auth::permissions_handler))
        .route(
            routes::GET_AUTH_REMOTE_PENDING,
            get(remote_login::pending_handler),
        )
        .route(
            routes::POST_AUTH_REMOTE_CHANNEL,
            post(remote_login::link_channel_handler),
        )
        .route(
            routes::POST_AUTH_REMOTE_REQUESTS_ID_DECISION,
            post(remote_login::decision_handler),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    // Admin routes (require auth + admin:*)
    let admin = Router::new()
        .route(routes::POST_ADMIN_USERS_ID_BLOCK, post(admin::block_handler))
        .route(
            routes::POST_ADMIN_USERS_ID_UNBLOCK,
            post(admin::unblock_handler),
        )
        .route(
            routes::GET_ADMIN_USERS_ID_PERMISSIONS,
            get(admin::permissions_handler),
        )
        .layer(axum::middleware::from_fn(middleware::auth::require_admin))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .merge(admin)
        .layer(cors)
        .with_state(state)
}
