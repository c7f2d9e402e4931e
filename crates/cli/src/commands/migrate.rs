//! Database migration command.
//!
//! # Environment Variables
//!
//! - `BACKLINE_DATABASE_URL` - `PostgreSQL` connection string
//!
//! # Migration Files
//!
//! `crates/site/migrations/` holds the `content` table and the
//! `tower_sessions.session` table used for admin sessions.

use backline_site::config::StorageConfig;
use backline_site::db;
use thiserror::Error;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// File storage has no schema to migrate.
    #[error("BACKLINE_DATABASE_URL is not set; file storage needs no migrations")]
    NoDatabase,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all site migrations.
///
/// # Errors
///
/// Returns `MigrationError` if no database is configured, the connection
/// fails or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let StorageConfig::Postgres { database_url } = StorageConfig::from_env() else {
        return Err(MigrationError::NoDatabase);
    };

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running site migrations...");
    sqlx::migrate!("../site/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
