use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use portal_server::config::Config;
use portal_server::services::IdentityService;
use portal_server::store::PgStore;
use portal_server::utils::error::AppError;

#[derive(Parser)]
#[command(name = "portal-admin", about = "Administrative commands for the event portal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Let a user edit and delete any event
    GrantStaff { username: String },
    /// Take staff rights away from a user
    RevokeStaff { username: String },
    /// Delete expired sessions
    ClearSessions,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    let database = config.database.as_ref().ok_or_else(|| {
        AppError::InternalServerError("DATABASE_URL must be set for admin commands".to_string())
    })?;

    let store = Arc::new(PgStore::connect(database).await?);
    let identity = IdentityService::new(store, config.session_ttl_hours);

    let (username, is_staff) = match cli.command {
        Command::GrantStaff { username } => (username, true),
        Command::RevokeStaff { username } => (username, false),
        Command::ClearSessions => {
            let removed = identity.clear_expired_sessions().await?;
            tracing::info!(removed, "Done");
            return Ok(());
        }
    };
    let user = identity.set_staff(&username, is_staff).await?;
    tracing::info!(username = %user.username, is_staff = user.is_staff, "Done");

    Ok(())
}
