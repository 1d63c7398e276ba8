use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "gatehouse", version, about = "Gatehouse operator CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Connection settings shared by the database commands.
#[derive(clap::Args, Debug)]
pub struct DbArgs {
    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/gatehouse"
    )]
    pub database_url: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the version.
    Version,

    /// Run embedded database migrations.
    Migrate {
        #[command(flatten)]
        db: DbArgs,
    },

    /// Block a user and revoke all of their refresh tokens.
    Block {
        /// User id or email.
        user: String,
        #[command(flatten)]
        db: DbArgs,
    },

    /// Unblock a user.
    Unblock {
        /// User id or email.
        user: String,
        #[command(flatten)]
        db: DbArgs,
    },

    /// Replace a user's roles.
    Roles {
        /// User id or email.
        user: String,
        /// Comma-separated roles, e.g. `teacher,admin`.
        roles: String,
        #[command(flatten)]
        db: DbArgs,
    },

    /// Print a user's permissions.
    Permissions {
        /// User id or email.
        user: String,
        #[command(flatten)]
        db: DbArgs,
    },
}
