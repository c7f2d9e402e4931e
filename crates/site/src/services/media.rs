//! Media library buckets.

use chrono::{DateTime, Utc};
use serde_json::Value;

use backline_core::content::ContentKey;
use backline_core::media::{MediaItem, add_item, remove_item};
use backline_core::types::MediaBucket;

use crate::db::ContentStore;
use crate::error::{AppError, Result};

const MEDIA: &str = ContentKey::Media.as_str();

/// Parse a bucket name from the URL.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for anything but photos, videos or flyers.
pub fn parse_bucket(name: &str) -> Result<MediaBucket> {
    name.parse().map_err(AppError::BadRequest)
}

/// Add an item to a bucket and return it with its generated id.
///
/// # Errors
///
/// Returns `AppError::Validation` if the body has no `url`, or a storage error.
pub async fn add(
    store: &dyn ContentStore,
    bucket: MediaBucket,
    body: Value,
    now: DateTime<Utc>,
) -> Result<MediaItem> {
    let item = MediaItem::from_json(body, now)?;
    let stored = item.clone();

    store
        .modify(MEDIA, move |mut document| {
            add_item(&mut document, bucket, &stored)
                .map_err(|e| AppError::Internal(format!("media item serialization failed: {e}")))?;
            Ok(document)
        })
        .await?;

    tracing::info!(bucket = %bucket, item_id = %item.id, "Media item added");
    Ok(item)
}

/// Remove an item from a bucket.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the bucket has no item with `id`, or a
/// storage error. Nothing is written when the item is absent.
pub async fn remove(store: &dyn ContentStore, bucket: MediaBucket, id: &str) -> Result<()> {
    let target = id.to_string();
    store
        .modify(MEDIA, move |mut document| {
            if remove_item(&mut document, bucket, &target) {
                Ok(document)
            } else {
                Err(AppError::NotFound("Media item".to_string()))
            }
        })
        .await?;

    tracing::info!(bucket = %bucket, item_id = id, "Media item removed");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::db::MemoryContentStore;

    #[tokio::test]
    async fn test_add_then_remove() {
        let store = MemoryContentStore::new();
        let item = add(
            &store,
            MediaBucket::Flyers,
            json!({"url": "/uploads/flyers/a.jpg", "caption": "Spring tour"}),
            Utc::now(),
        )
        .await
        .unwrap();

        let document = store.read("media").await.unwrap().unwrap();
        assert_eq!(document["flyers"][0]["id"], json!(item.id.as_str()));
        assert_eq!(document["photos"], json!([]));

        remove(&store, MediaBucket::Flyers, item.id.as_str()).await.unwrap();
        let document = store.read("media").await.unwrap().unwrap();
        assert_eq!(document["flyers"], json!([]));

        assert!(matches!(
            remove(&store, MediaBucket::Flyers, item.id.as_str()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_parse_bucket() {
        assert_eq!(parse_bucket("videos").unwrap(), MediaBucket::Videos);
        assert!(matches!(parse_bucket("audio"), Err(AppError::BadRequest(_))));
    }
}
