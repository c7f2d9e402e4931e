//! Content document access shared by the admin and public routes.
//!
//! - GET of a missing document returns the key's default shape.
//! - PUT replaces the whole document. Known domains must keep their
//!   top-level JSON type; free-form keys accept any JSON value.
//! - PATCH merges one level deep and is refused for array domains.

use serde_json::{Map, Value};

use backline_core::content::{ContentError, ContentKey, DocumentShape, shallow_merge, validate_key};
use backline_core::release::Release;
use backline_core::visibility::VisibilityConfig;

use crate::db::ContentStore;
use crate::error::{AppError, Result};

/// Marker put in front of the last characters of a masked secret.
const MASK: &str = "••••";

/// Read a document or its default shape.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for an invalid key, or a storage error.
pub async fn get(store: &dyn ContentStore, key: &str) -> Result<Value> {
    let key = validate_key(key)?;
    Ok(store.read_or_default(key).await?)
}

/// Replace a document.
///
/// The visibility tree is coerced into shape before it is stored. Music
/// must parse as a list of releases.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for an invalid key, a value of the
/// wrong top-level type or an unparseable release, or a storage error.
pub async fn replace(store: &dyn ContentStore, key: &str, value: Value) -> Result<Value> {
    let key = validate_key(key)?;
    let value = match ContentKey::parse(key) {
        Some(ContentKey::Visibility) => VisibilityConfig::coerce(&value).to_value(),
        Some(known) => {
            known.check_shape(&value)?;
            if known == ContentKey::Music {
                check_releases(&value)?;
            }
            value
        }
        None => value,
    };

    store.write(key, &value).await?;
    tracing::info!(key, "Content replaced");
    Ok(value)
}

/// Shallow-merge `patch` into a document.
///
/// The visibility tree merges page by page instead, and accepts the same
/// bare page map as [`replace`].
///
/// # Errors
///
/// Returns `AppError::BadRequest` for an invalid key, an array domain, or
/// a patch that is not an object, or a storage error.
pub async fn patch(store: &dyn ContentStore, key: &str, patch: Value) -> Result<Value> {
    let key = validate_key(key)?;
    let known = ContentKey::parse(key);

    if let Some(known) = known.filter(|k| k.shape() == DocumentShape::Array) {
        return Err(AppError::BadRequest(format!(
            "{known} is a list; replace it with PUT"
        )));
    }
    if !patch.is_object() {
        return Err(ContentError::PatchNotObject.into());
    }

    let merged = store
        .modify(key, move |current| {
            Ok(match known {
                Some(ContentKey::Visibility) => VisibilityConfig::coerce(&current)
                    .merge_pages(&patch)
                    .to_value(),
                _ => shallow_merge(current, patch)?,
            })
        })
        .await?;

    tracing::info!(key, "Content patched");
    Ok(merged)
}

/// Read a document as the public site may see it.
///
/// Private domains (orders, messages, analytics) are not found. Payment
/// secrets are masked and music is filtered through the release rules.
///
/// # Errors
///
/// Returns `AppError::NotFound` for keys the public may not read, or a
/// storage error.
pub async fn get_public(store: &dyn ContentStore, key: &str) -> Result<Value> {
    let key = validate_key(key).map_err(|_| AppError::NotFound("Content".to_string()))?;
    let known = ContentKey::parse(key);
    if known.is_some_and(|k| !k.is_public()) {
        return Err(AppError::NotFound("Content".to_string()));
    }

    let value = store.read_or_default(key).await?;
    Ok(match known {
        Some(ContentKey::PaymentConfig) => mask_secrets(value),
        Some(ContentKey::Music) => public_music(value),
        _ => value,
    })
}

fn check_releases(value: &Value) -> Result<()> {
    Release::list_from(value.clone())
        .map(drop)
        .map_err(|e| AppError::BadRequest(format!("invalid release: {e}")))
}

/// Parse the stored releases, skipping any that do not parse.
#[must_use]
pub fn releases(document: Value) -> Vec<Release> {
    let Value::Array(records) = document else {
        tracing::warn!("Stored music document is not a list");
        return Vec::new();
    };
    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<Release>(record) {
            Ok(release) => Some(release),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed stored release");
                None
            }
        })
        .collect()
}

/// Releases for public listings: unlisted ones removed, gated data withheld.
#[must_use]
pub fn public_music(document: Value) -> Value {
    Value::Array(
        releases(document)
            .iter()
            .filter(|r| r.is_listed())
            .map(|r| r.public_view(None))
            .collect(),
    )
}

/// Mask every string under a field whose name contains "secret".
///
/// `"sk_live_abcd1234"` becomes `"••••1234"`. Nested objects are walked.
#[must_use]
pub fn mask_secrets(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(name, v)| {
                    let v = if name.to_ascii_lowercase().contains("secret") {
                        mask_value(v)
                    } else {
                        mask_secrets(v)
                    };
                    (name, v)
                })
                .collect::<Map<_, _>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(mask_secrets).collect()),
        other => other,
    }
}

fn mask_value(value: Value) -> Value {
    match value {
        Value::String(s) if s.is_empty() => Value::String(s),
        Value::String(s) => {
            let mut tail: Vec<char> = s.chars().rev().take(4).collect();
            tail.reverse();
            Value::String(format!("{MASK}{}", tail.into_iter().collect::<String>()))
        }
        Value::Null => Value::Null,
        _ => Value::String(MASK.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::db::MemoryContentStore;

    #[test]
    fn test_mask_secrets() {
        let masked = mask_secrets(json!({
            "publishableKey": "pk_live_visible",
            "secretKey": "sk_live_abcd1234",
            "webhookSecret": "ab",
            "nested": {"clientSecret": "xyz98765"},
            "SECRET_NUMBER": 12345
        }));
        assert_eq!(masked["publishableKey"], json!("pk_live_visible"));
        assert_eq!(masked["secretKey"], json!("••••1234"));
        assert_eq!(masked["webhookSecret"], json!("••••ab"));
        assert_eq!(masked["nested"]["clientSecret"], json!("••••8765"));
        assert_eq!(masked["SECRET_NUMBER"], json!("••••"));
    }

    #[tokio::test]
    async fn test_patch_rejects_array_domains() {
        let store = MemoryContentStore::new();
        let err = patch(&store, "products", json!({"a": 1})).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_replace_checks_shape_for_known_keys() {
        let store = MemoryContentStore::new();
        assert!(replace(&store, "shows", json!({"not": "a list"})).await.is_err());
        assert!(replace(&store, "about", json!([1, 2])).await.is_err());
        assert_eq!(
            replace(&store, "tour-notes", json!("free text")).await.unwrap(),
            json!("free text")
        );
    }

    #[tokio::test]
    async fn test_replace_rejects_unparseable_releases() {
        let store = MemoryContentStore::new();
        let err = replace(&store, "music", json!([{"id": "r1", "title": "A"}, {"id": 2, "title": "B"}]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(store.read("music").await.unwrap(), None);
    }

    #[test]
    fn test_public_music_skips_malformed_releases() {
        let listed = public_music(json!([
            {"id": "r1", "title": "A", "tracks": []},
            {"id": "r2", "title": "B", "visibility": "secret-ish"}
        ]));
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["id"], json!("r1"));
        assert_eq!(public_music(json!({"not": "a list"})), json!([]));
    }

    #[tokio::test]
    async fn test_visibility_patch_merges_pages() {
        let store = MemoryContentStore::new();
        let merged = patch(&store, "visibility", json!({"store": {"visible": false}}))
            .await
            .unwrap();
        assert_eq!(merged["pages"]["store"]["visible"], json!(false));
        assert!(merged.get("store").is_none());
        assert_eq!(merged["pages"]["home"]["visible"], json!(true));
    }

    #[tokio::test]
    async fn test_public_hides_private_domains() {
        let store = MemoryContentStore::new();
        store.write("orders", &json!([{"id": "1"}])).await.unwrap();
        assert!(matches!(
            get_public(&store, "orders").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            get_public(&store, "../orders").await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(get_public(&store, "homepage").await.unwrap(), json!({}));
    }
}
