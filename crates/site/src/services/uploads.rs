//! Admin file uploads written under the public uploads directory.

use std::path::Path;

use axum::body::Bytes;
use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use serde::Serialize;

use backline_core::types::UploadId;

use crate::config::UploadConfig;
use crate::error::{AppError, Result};

/// Folders an upload may be filed under.
pub const ALLOWED_FOLDERS: [&str; 7] = [
    "products", "shows", "music", "media", "about", "homepage", "flyers",
];

/// Accepted content types and the extension stored for each.
const ALLOWED_TYPES: [(&str, &str); 7] = [
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
    ("audio/mpeg", "mp3"),
    ("audio/wav", "wav"),
    ("video/mp4", "mp4"),
];

/// Response from a successful upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Public path of the stored file.
    pub url: String,
}

struct FilePart {
    content_type: String,
    data: Bytes,
}

fn multipart_error(err: &MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Upload exceeds the size limit".to_string())
    } else {
        AppError::BadRequest(format!("Multipart error: {}", err.body_text()))
    }
}

/// Extension for an accepted content type, ignoring parameters.
#[must_use]
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ALLOWED_TYPES
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
}

/// Read the `file` and `folder` fields and store the file.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for a missing field, a folder outside
/// [`ALLOWED_FOLDERS`] or an unsupported type, `AppError::PayloadTooLarge`
/// above the configured limit, or `AppError::Internal` if writing fails.
pub async fn receive(config: &UploadConfig, mut multipart: Multipart) -> Result<UploadResponse> {
    let mut folder = None;
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| multipart_error(&e))? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "folder" => {
                folder = Some(field.text().await.map_err(|e| multipart_error(&e))?);
            }
            "file" => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(|e| multipart_error(&e))?;
                file = Some(FilePart { content_type, data });
            }
            _ => {}
        }
    }

    let folder = folder.ok_or_else(|| AppError::BadRequest("Missing folder field".to_string()))?;
    let file = file.ok_or_else(|| AppError::BadRequest("Missing file field".to_string()))?;
    store(config, folder.trim(), &file.content_type, &file.data).await
}

/// Validate and write one uploaded file.
///
/// # Errors
///
/// See [`receive`].
pub async fn store(
    config: &UploadConfig,
    folder: &str,
    content_type: &str,
    data: &[u8],
) -> Result<UploadResponse> {
    if !ALLOWED_FOLDERS.contains(&folder) {
        return Err(AppError::BadRequest(format!("Folder not allowed: {folder}")));
    }
    let ext = extension_for(content_type)
        .ok_or_else(|| AppError::BadRequest(format!("File type not allowed: {content_type}")))?;
    if data.len() > config.max_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "Upload exceeds {} bytes",
            config.max_bytes
        )));
    }
    if data.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
    }

    let file_name = format!("{}.{ext}", UploadId::generate());
    write_file(&config.dir.join(folder), &file_name, data)
        .await
        .map_err(|e| AppError::Internal(format!("upload write failed: {e}")))?;

    tracing::info!(folder, file = %file_name, bytes = data.len(), "File uploaded");
    Ok(UploadResponse {
        url: format!("/uploads/{folder}/{file_name}"),
    })
}

async fn write_file(dir: &Path, file_name: &str, data: &[u8]) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(dir.join(file_name), data).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(dir: &Path) -> UploadConfig {
        UploadConfig {
            dir: dir.to_path_buf(),
            max_bytes: 16,
        }
    }

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for("Audio/MPEG; foo=bar"), Some("mp3"));
        assert_eq!(extension_for("text/html"), None);
        assert_eq!(extension_for("image/svg+xml"), None);
    }

    #[tokio::test]
    async fn test_store_writes_under_folder() {
        let dir = tempfile::tempdir().unwrap();
        let response = store(&config(dir.path()), "flyers", "image/png", b"png-bytes")
            .await
            .unwrap();

        let relative = response.url.strip_prefix("/uploads/").unwrap();
        assert!(relative.starts_with("flyers/"));
        assert!(relative.ends_with(".png"));
        let written = std::fs::read(dir.path().join(relative)).unwrap();
        assert_eq!(written, b"png-bytes");
    }

    #[tokio::test]
    async fn test_store_rejections() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());

        assert!(matches!(
            store(&config, "../etc", "image/png", b"x").await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            store(&config, "media", "application/pdf", b"x").await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            store(&config, "media", "image/png", &[0u8; 17]).await,
            Err(AppError::PayloadTooLarge(_))
        ));
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }
}
