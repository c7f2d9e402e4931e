//! In-memory content store.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{ContentStore, RepositoryError, UpdateFn};
use crate::error::AppError;

/// Content store held in process memory. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryContentStore {
    documents: RwLock<HashMap<String, Value>>,
}

impl MemoryContentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn read(&self, key: &str) -> Result<Option<Value>, RepositoryError> {
        Ok(self.documents.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &Value) -> Result<(), RepositoryError> {
        self.documents
            .write()
            .await
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn update(&self, key: &str, f: UpdateFn) -> Result<Value, AppError> {
        // The write guard is held across the whole read-modify-write
        let mut documents = self.documents.write().await;
        let next = f(documents.get(key).cloned())?;
        documents.insert(key.to_string(), next.clone());
        Ok(next)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
