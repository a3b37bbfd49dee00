//! Operator CLI for the portal. Used to seed the first admin profile and to
//! check database connectivity from a deploy host.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use portal_api::auth::hash_password;
use portal_api::database::manager::DatabaseManager;

#[derive(Parser)]
#[command(name = "portal-admin", about = "Portal API operator tooling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create (or promote) an admin profile
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
    },
    /// Ping the database
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portal_api=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::CreateAdmin { email, name, password } => {
            if password.len() < 8 {
                bail!("password must be at least 8 characters");
            }
            let email = email.trim().to_lowercase();

            let pool = DatabaseManager::pool()
                .await
                .context("failed to connect to database")?;

            // Upsert on email so rerunning the command promotes an existing profile
            let (id,): (uuid::Uuid,) = sqlx::query_as(
                "INSERT INTO profiles (email, name, role, is_active, password_hash)
                 VALUES ($1, $2, 'admin', true, $3)
                 ON CONFLICT (email) DO UPDATE
                 SET role = 'admin', is_active = true, name = EXCLUDED.name,
                     password_hash = EXCLUDED.password_hash, updated_at = now()
                 RETURNING id",
            )
            .bind(&email)
            .bind(name.trim())
            .bind(hash_password(&password))
            .fetch_one(&pool)
            .await
            .context("failed to create admin profile")?;

            println!("Admin profile ready: {} ({})", email, id);
        }
        Command::Health => {
            DatabaseManager::health_check()
                .await
                .context("database health check failed")?;
            println!("Database: ok");
        }
    }

    Ok(())
}
