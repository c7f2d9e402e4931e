//! File-backed content store.
//!
//! Each document is `<data_dir>/<key>.json`. Writes go to a temporary file
//! in the same directory and are renamed over the target, so readers never
//! observe a partially written document.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use backline_core::content::validate_key;

use super::{ContentStore, RepositoryError, UpdateFn};
use crate::error::AppError;

/// Content store over a directory of JSON files.
pub struct FileContentStore {
    dir: PathBuf,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl FileContentStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Io` if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            locks: Mutex::new(HashMap::new()),
        })
    }

    /// Directory holding the documents.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, RepositoryError> {
        let key = validate_key(key).map_err(|e| RepositoryError::InvalidKey(e.to_string()))?;
        Ok(self.dir.join(format!("{key}.json")))
    }

    fn lock_for(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(key.to_string()).or_default())
    }

    async fn read_path(path: &Path) -> Result<Option<Value>, RepositoryError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_path(&self, path: &Path, value: &Value) -> Result<(), RepositoryError> {
        let bytes = serde_json::to_vec_pretty(value)?;
        let tmp = self.dir.join(format!(".{}.tmp", Uuid::new_v4()));

        tokio::fs::write(&tmp, &bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl ContentStore for FileContentStore {
    async fn read(&self, key: &str) -> Result<Option<Value>, RepositoryError> {
        let path = self.path_for(key)?;
        Self::read_path(&path).await
    }

    async fn write(&self, key: &str, value: &Value) -> Result<(), RepositoryError> {
        let path = self.path_for(key)?;
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;
        self.write_path(&path, value).await
    }

    async fn update(&self, key: &str, f: UpdateFn) -> Result<Value, AppError> {
        let path = self.path_for(key)?;
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;

        let current = Self::read_path(&path).await?;
        let next = f(current)?;
        self.write_path(&path, &next).await?;
        Ok(next)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        tokio::fs::metadata(&self.dir).await?;
        Ok(())
    }
}
