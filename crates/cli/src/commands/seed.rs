//! Seed the content store with default documents.
//!
//! Every known content key gets its default shape (empty lists, the
//! standard visibility tree, default shipping options). Existing documents
//! are left alone unless `--force` is given.

use std::sync::Arc;

use backline_core::content::ContentKey;
use backline_site::config::StorageConfig;
use backline_site::db::{self, ContentStore, FileContentStore, PgContentStore, RepositoryError};
use tracing::info;

/// Counts reported after seeding.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub written: usize,
    pub skipped: usize,
}

/// Open the configured store and seed it.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or a write fails.
pub async fn run(force: bool) -> Result<SeedSummary, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let store: Arc<dyn ContentStore> = match StorageConfig::from_env() {
        StorageConfig::Postgres { database_url } => {
            let pool = db::create_pool(&database_url).await?;
            info!("Connected to database");
            Arc::new(PgContentStore::new(pool))
        }
        StorageConfig::File { data_dir } => {
            info!(data_dir = %data_dir.display(), "Using file content store");
            Arc::new(FileContentStore::open(data_dir).await?)
        }
    };

    let summary = seed(store.as_ref(), force).await?;
    info!(
        written = summary.written,
        skipped = summary.skipped,
        "Seeding complete!"
    );
    Ok(summary)
}

/// Write the default document for each known key.
///
/// # Errors
///
/// Returns the first storage error.
pub async fn seed(store: &dyn ContentStore, force: bool) -> Result<SeedSummary, RepositoryError> {
    let mut summary = SeedSummary::default();

    for key in ContentKey::ALL {
        if !force && store.read(key.as_str()).await?.is_some() {
            summary.skipped += 1;
            continue;
        }
        store.write(key.as_str(), &key.default_value()).await?;
        info!(key = %key, "Wrote default document");
        summary.written += 1;
    }

    Ok(summary)
}
