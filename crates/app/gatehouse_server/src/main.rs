//! Gatehouse authentication server binary.
//!
//! Serves the HTTP API over Postgres-backed stores, or process-local stores
//! with `--in-memory` for development.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use gatehouse_api::AppState;
use gatehouse_api::config::ApiConfig;
use gatehouse_core::clock::system_clock;
use gatehouse_core::login_tokens::{
    LoginTokenStore, MemoryLoginTokenStore, PgLoginTokenStore, spawn_eviction_task,
};
use gatehouse_core::users::{MemoryUserStore, PgUserStore, UserStore};
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// CLI arguments for the server.
#[derive(Parser, Debug)]
#[command(name = "gatehouse_server", about = "Gatehouse authentication server")]
struct Args {
    /// Address to listen on; overrides `BIND_ADDR`.
    #[arg(long)]
    bind: Option<String>,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/gatehouse"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 10)]
    max_connections: u32,

    /// Keep users and login tokens in process memory instead of Postgres.
    #[arg(long, default_value_t = false)]
    in_memory: bool,

    /// Seconds between sweeps of expired login tokens.
    #[arg(long, default_value_t = 60)]
    eviction_interval_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,gatehouse_api=debug,gatehouse_core=debug")
            }),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env();
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    config.pg_connection_url = args.database_url;
    let store_opts = config.auth_config().store;

    let (users, login_tokens): (Arc<dyn UserStore>, Arc<dyn LoginTokenStore>) = if args.in_memory
    {
        warn!("in-memory mode: all accounts are lost on exit");
        (
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryLoginTokenStore::new()),
        )
    } else {
        info!(max_connections = args.max_connections, "configuring connection pool");
        let pool = PgPoolOptions::new()
            .max_connections(args.max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.pg_connection_url)
            .await?;

        info!("running database migrations");
        gatehouse_api::migrate(&pool).await?;

        (
            Arc::new(PgUserStore::new(pool.clone(), store_opts)),
            Arc::new(PgLoginTokenStore::new(pool, store_opts)),
        )
    };

    let shutdown = CancellationToken::new();
    let eviction = spawn_eviction_task(
        login_tokens.clone(),
        system_clock(),
        Duration::from_secs(args.eviction_interval_secs.max(1)),
        shutdown.clone(),
    );

    let state = AppState::from_stores(config.clone(), users, login_tokens, system_clock());
    let app = gatehouse_api::router(state).into_make_service_with_connect_info::<SocketAddr>();

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    let serve_result = axum::serve(listener, app)
        .with_graceful_shutdown({
            let shutdown = shutdown.clone();
            async move {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("interrupt received, shutting down"),
                    _ = shutdown.cancelled() => {}
                }
            }
        })
        .await;

    shutdown.cancel();
    let _ = eviction.await;

    serve_result?;

    Ok(())
}
