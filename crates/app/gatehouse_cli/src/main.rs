// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use std::time::Duration;

use clap::Parser;
use cli::{Cli, Commands, DbArgs};
use gatehouse_core::config::StoreOptions;
use gatehouse_core::models::user::User;
use gatehouse_core::permissions::parse_roles;
use gatehouse_core::users::{PgUserStore, UserStore};
use gatehouse_core::validation::normalize_email;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

mod cli;
mod logging;

fn main() -> Result<()> {
    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<()> {
    logging::init()?;

    let args = Cli::parse();

    match args.command {
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        command => runtime()?.block_on(run_db(command)),
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

async fn run_db(command: Commands) -> Result<()> {
    match command {
        Commands::Version => Ok(()),
        Commands::Migrate { db } => {
            let pool = connect(&db).await?;
            gatehouse_core::migrate::migrate(&pool).await?;
            log::info!("migrations applied");
            Ok(())
        }
        Commands::Block { user, db } => {
            let store = store(&db).await?;
            let user = find_user(&store, &user).await?;
            store.block(user.id).await?;
            store.remove_all_refresh_tokens(user.id).await?;
            log::info!("blocked {} ({})", user.email, user.id);
            Ok(())
        }
        Commands::Unblock { user, db } => {
            let store = store(&db).await?;
            let user = find_user(&store, &user).await?;
            store.unblock(user.id).await?;
            log::info!("unblocked {} ({})", user.email, user.id);
            Ok(())
        }
        Commands::Roles { user, roles, db } => {
            let roles = parse_roles(&roles);
            if roles.is_empty() {
                return Err(Error::Custom("a user needs at least one role".into()));
            }
            let store = store(&db).await?;
            let user = find_user(&store, &user).await?;
            store.set_roles(user.id, &roles).await?;
            log::info!("{} now has roles {}", user.email, roles.join(","));
            Ok(())
        }
        Commands::Permissions { user, db } => {
            let store = store(&db).await?;
            let user = find_user(&store, &user).await?;
            for permission in store.get_permissions(user.id).await? {
                println!("{permission}");
            }
            Ok(())
        }
    }
}

async fn connect(db: &DbArgs) -> Result<PgPool> {
    Ok(PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&db.database_url)
        .await?)
}

async fn store(db: &DbArgs) -> Result<PgUserStore> {
    Ok(PgUserStore::new(connect(db).await?, StoreOptions::default()))
}

/// Look a user up by id or, failing that, by email.
async fn find_user(store: &PgUserStore, key: &str) -> Result<User> {
    let found = match key.parse::<Uuid>() {
        Ok(id) => store.find_by_id(id).await?,
        Err(_) => store.find_by_email(&normalize_email(key)).await?,
    };
    found.ok_or_else(|| Error::Custom(format!("no user matches {key}")))
}
