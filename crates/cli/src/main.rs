//! Backline CLI - database migrations, seeding and admin setup.
//!
//! # Usage
//!
//! ```bash
//! # Create the content and session tables
//! backline migrate
//!
//! # Write default documents for every known content key
//! backline seed
//!
//! # Overwrite existing documents with defaults
//! backline seed --force
//!
//! # Print an Argon2 hash for BACKLINE_ADMIN_PASSWORD_HASH
//! echo 'a long admin password' | backline hash-password
//! ```
//!
//! Storage is chosen the same way as the site server: `PostgreSQL` when
//! `BACKLINE_DATABASE_URL` is set, JSON files under `BACKLINE_DATA_DIR`
//! otherwise.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "backline")]
#[command(author, version, about = "Backline band site CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Write default content documents
    Seed {
        /// Replace documents that already exist
        #[arg(short, long)]
        force: bool,
    },
    /// Hash an admin password read from stdin
    HashPassword,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { force } => {
            commands::seed::run(force).await?;
        }
        Commands::HashPassword => commands::password::run()?,
    }
    Ok(())
}
