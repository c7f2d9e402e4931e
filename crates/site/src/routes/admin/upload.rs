//! Admin upload handler.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
    routing::post,
};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::services::uploads::{self, UploadResponse};
use crate::state::AppState;

/// Allowance for multipart boundaries and the `folder` field.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the upload router. The body limit follows the configured maximum.
pub fn router(max_bytes: usize) -> Router<AppState> {
    Router::new().route(
        "/upload",
        post(upload).layer(DefaultBodyLimit::max(max_bytes.saturating_add(MULTIPART_OVERHEAD))),
    )
}

/// POST /api/admin/upload
async fn upload(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>)> {
    let multipart = multipart.map_err(AppError::from)?;
    let response = uploads::receive(&state.config().upload, multipart).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
