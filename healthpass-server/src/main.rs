//! healthpass command line
//!
//! ```text
//! healthpass run                 serve the API
//! healthpass db create|clean|reset
//! healthpass permission list     permission names checked by the routes
//! healthpass user promote|demote --phone <PHONE>
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use healthpass_server::auth::permissions::KNOWN_PERMISSIONS;
use healthpass_server::db::DbService;
use healthpass_server::db::repository::user;
use healthpass_server::{AppState, Config, Server, init_logger_with_file};

#[derive(Debug, Parser)]
#[command(name = "healthpass", version, about = "Health pass backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the HTTP server
    Run,
    /// Manage the database schema
    #[command(subcommand)]
    Db(DbCommand),
    /// Inspect permissions
    #[command(subcommand)]
    Permission(PermissionCommand),
    /// Grant or revoke superuser rights
    #[command(subcommand)]
    User(UserCommand),
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum DbCommand {
    /// Create missing tables
    Create,
    /// Delete every row, keep the tables
    Clean,
    /// Create missing tables, then delete every row
    Reset,
}

#[derive(Debug, Subcommand)]
enum PermissionCommand {
    /// Print every permission name the routes check
    List,
}

#[derive(Debug, Subcommand)]
enum UserCommand {
    /// Make the user a superuser
    Promote {
        #[arg(long)]
        phone: String,
    },
    /// Revoke superuser rights
    Demote {
        #[arg(long)]
        phone: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Command::Permission(PermissionCommand::List) = cli.command {
        for name in KNOWN_PERMISSIONS {
            println!("{name}");
        }
        return Ok(());
    }

    let config = Config::from_env().context("invalid configuration")?;
    init_logger_with_file(&config.log_level, config.log_dir.as_deref());

    match cli.command {
        Command::Run => {
            let state = AppState::new(config)
                .await
                .context("failed to open the database")?;
            Server::new(state).run().await.context("server error")?;
        }
        Command::Db(cmd) => {
            let db = DbService::connect(&config)
                .await
                .with_context(|| format!("failed to open {}", config.database_url))?;
            let result = match cmd {
                DbCommand::Create => db.create_tables().await,
                DbCommand::Clean => db.clean().await,
                DbCommand::Reset => db.reset().await,
            };
            result.with_context(|| format!("db {cmd:?} failed"))?;
            println!("db {cmd:?}: done");
        }
        Command::User(cmd) => {
            let (phone, is_superuser) = match cmd {
                UserCommand::Promote { phone } => (phone, true),
                UserCommand::Demote { phone } => (phone, false),
            };
            let db = DbService::connect(&config)
                .await
                .with_context(|| format!("failed to open {}", config.database_url))?;
            let mut conn = db.pool.acquire().await?;
            let found = user::find_by_phone(&mut conn, &phone)
                .await?
                .with_context(|| format!("no user with phone {phone}"))?;
            user::set_superuser(&mut conn, found.id, is_superuser).await?;
            tracing::info!(user_id = found.id, is_superuser, "Superuser flag changed");
            println!("user {}: is_superuser = {is_superuser}", found.id);
        }
        Command::Permission(_) => {}
    }

    Ok(())
}
