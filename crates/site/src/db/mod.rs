//! Content persistence.
//!
//! All site content is stored as JSON documents addressed by a string key.
//! Three backends implement [`ContentStore`]:
//!
//! - [`PgContentStore`] - `content` table in `PostgreSQL` (production)
//! - [`FileContentStore`] - one `<key>.json` file per key in a data directory
//! - [`MemoryContentStore`] - in-process map for tests and demos
//!
//! # Migrations
//!
//! Migrations are stored in `crates/site/migrations/` and run via:
//! ```bash
//! cargo run -p backline-cli -- migrate
//! ```
//!
//! No schema validation happens at this layer; documents are stored as given.

mod file;
mod memory;
mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use backline_core::content::default_for;

use crate::error::AppError;

pub use file::FileContentStore;
pub use memory::MemoryContentStore;
pub use postgres::PgContentStore;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem error from the file store.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document is not valid JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key cannot be used as a storage key.
    #[error("invalid key: {0}")]
    InvalidKey(String),
}

/// Read-modify-write step passed to [`ContentStore::update`].
///
/// Receives the current document (`None` if it was never written) and
/// returns the document to store. An error aborts the update without
/// writing and is returned to the caller unchanged.
pub type UpdateFn = Box<dyn FnOnce(Option<Value>) -> Result<Value, AppError> + Send>;

/// Key/value storage for content documents.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Read a document. Returns `None` if the key was never written.
    async fn read(&self, key: &str) -> Result<Option<Value>, RepositoryError>;

    /// Create or replace a document.
    async fn write(&self, key: &str, value: &Value) -> Result<(), RepositoryError>;

    /// Read, transform and write a document with no concurrent writer to
    /// the same key in between. Returns the stored document.
    async fn update(&self, key: &str, f: UpdateFn) -> Result<Value, AppError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

impl dyn ContentStore + '_ {
    /// Read a document, falling back to the key's default shape.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend fails.
    pub async fn read_or_default(&self, key: &str) -> Result<Value, RepositoryError> {
        Ok(self.read(key).await?.unwrap_or_else(|| default_for(key)))
    }

    /// [`ContentStore::update`] over the document or its default shape.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns, or a storage error.
    pub async fn modify<F>(&self, key: &str, f: F) -> Result<Value, AppError>
    where
        F: FnOnce(Value) -> Result<Value, AppError> + Send + 'static,
    {
        let default_key = key.to_string();
        self.update(
            key,
            Box::new(move |current| f(current.unwrap_or_else(|| default_for(&default_key)))),
        )
        .await
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
