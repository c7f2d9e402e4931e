//! Media library: photos, videos and flyers.
//!
//! The `media` document holds one array per [`MediaBucket`]. Items are
//! added and removed individually; other keys in the document are kept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{MediaBucket, MediaItemId};
use crate::validation::{FieldErrors, FieldSpec, Rule, Schema};

/// An item in one media bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: MediaItemId,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const MEDIA_ITEM_SCHEMA: Schema = Schema::new(&[
    FieldSpec { path: "url", rules: &[Rule::Required, Rule::NonBlank, Rule::MaxLength(2048)] },
    FieldSpec { path: "caption", rules: &[Rule::String, Rule::MaxLength(500)] },
    FieldSpec { path: "title", rules: &[Rule::String, Rule::MaxLength(200)] },
]);

impl MediaItem {
    /// Build a new item from an admin request body.
    ///
    /// Any `id` or `createdAt` in the body is replaced.
    ///
    /// # Errors
    ///
    /// Returns field errors if `url` is missing or a field has the wrong type.
    pub fn from_json(mut body: Value, now: DateTime<Utc>) -> Result<Self, FieldErrors> {
        MEDIA_ITEM_SCHEMA.validate(&body)?;
        if let Some(object) = body.as_object_mut() {
            object.insert(
                "id".to_string(),
                Value::String(crate::types::id::generate_at(now)),
            );
            object.insert("createdAt".to_string(), Value::String(now.to_rfc3339()));
        }
        serde_json::from_value(body).map_err(|e| FieldErrors::single("body", e.to_string()))
    }
}

fn take_bucket(document: &mut Value, bucket: MediaBucket) -> Vec<Value> {
    match document.get_mut(bucket.as_str()).map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

fn put_bucket(document: &mut Value, bucket: MediaBucket, items: Vec<Value>) {
    if !document.is_object() {
        *document = Value::Object(Map::new());
    }
    if let Some(object) = document.as_object_mut() {
        object.insert(bucket.as_str().to_string(), Value::Array(items));
    }
}

/// Append `item` to `bucket` in the media document.
///
/// # Errors
///
/// Returns a serde error if the item cannot be serialized.
pub fn add_item(
    document: &mut Value,
    bucket: MediaBucket,
    item: &MediaItem,
) -> Result<(), serde_json::Error> {
    let value = serde_json::to_value(item)?;
    let mut items = take_bucket(document, bucket);
    items.push(value);
    put_bucket(document, bucket, items);
    Ok(())
}

/// Remove the item with `id` from `bucket`. Returns whether it existed.
pub fn remove_item(document: &mut Value, bucket: MediaBucket, id: &str) -> bool {
    let mut items = take_bucket(document, bucket);
    let before = items.len();
    items.retain(|item| item.get("id").and_then(Value::as_str) != Some(id));
    let removed = items.len() != before;
    put_bucket(document, bucket, items);
    removed
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_json_assigns_id_and_timestamp() {
        let now = Utc::now();
        let item = MediaItem::from_json(
            json!({"id": "chosen", "url": "/uploads/media/a.jpg", "credit": "Jo"}),
            now,
        )
        .unwrap();
        assert_ne!(item.id.as_str(), "chosen");
        assert_eq!(item.created_at.timestamp_millis(), now.timestamp_millis());
        assert_eq!(item.extra["credit"], json!("Jo"));
    }

    #[test]
    fn test_from_json_requires_url() {
        let errors = MediaItem::from_json(json!({"caption": "hi"}), Utc::now()).unwrap_err();
        assert!(errors.contains("url"));
    }

    #[test]
    fn test_add_and_remove_keep_other_buckets() {
        let mut document = json!({"photos": [{"id": "p1", "url": "a"}], "videos": [], "note": "x"});
        let item = MediaItem::from_json(json!({"url": "/f.png"}), Utc::now()).unwrap();

        add_item(&mut document, MediaBucket::Flyers, &item).unwrap();
        assert_eq!(document["flyers"].as_array().unwrap().len(), 1);
        assert_eq!(document["note"], json!("x"));

        assert!(remove_item(&mut document, MediaBucket::Photos, "p1"));
        assert!(!remove_item(&mut document, MediaBucket::Photos, "p1"));
        assert!(!remove_item(&mut document, MediaBucket::Videos, item.id.as_str()));
        assert_eq!(document["flyers"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_add_repairs_malformed_document() {
        let mut document = json!("broken");
        let item = MediaItem::from_json(json!({"url": "/v.mp4"}), Utc::now()).unwrap();
        add_item(&mut document, MediaBucket::Videos, &item).unwrap();
        assert_eq!(document["videos"][0]["url"], json!("/v.mp4"));
    }
}
