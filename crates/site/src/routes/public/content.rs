//! Read-only content for the public site.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Deserialize;
use serde_json::Value;

use backline_core::content::ContentKey;

use crate::error::{AppError, Result};
use crate::extract::QueryParams;
use crate::services::content;
use crate::state::AppState;

const NAMED: [ContentKey; 10] = [
    ContentKey::About,
    ContentKey::Homepage,
    ContentKey::Socials,
    ContentKey::SiteConfig,
    ContentKey::Visibility,
    ContentKey::Media,
    ContentKey::Products,
    ContentKey::Shows,
    ContentKey::PaymentConfig,
    ContentKey::Music,
];

/// Build the public content router.
pub fn router() -> Router<AppState> {
    let router = Router::new()
        .route("/content/{key}", get(get_content))
        .route("/music/{release}", get(show_release));

    NAMED.into_iter().fold(router, |router, key| {
        router.route(
            &format!("/{key}"),
            get(move |state: State<AppState>| read(state, key)),
        )
    })
}

async fn read(State(state): State<AppState>, key: ContentKey) -> Result<Json<Value>> {
    content::get_public(state.store(), key.as_str()).await.map(Json)
}

/// GET /api/public/content/{key}
async fn get_content(State(state): State<AppState>, Path(key): Path<String>) -> Result<Json<Value>> {
    content::get_public(state.store(), &key).await.map(Json)
}

/// Query parameters for a gated release.
#[derive(Debug, Deserialize)]
pub struct Unlock {
    #[serde(default)]
    pub password: Option<String>,
}

/// One release by id or slug, unlocked when `?password=` matches.
///
/// GET /api/public/music/{release}
async fn show_release(
    State(state): State<AppState>,
    Path(key): Path<String>,
    QueryParams(unlock): QueryParams<Unlock>,
) -> Result<Json<Value>> {
    let document = state
        .store()
        .read_or_default(ContentKey::Music.as_str())
        .await?;
    content::releases(document)
        .iter()
        .find(|release| release.matches(&key))
        .map(|release| Json(release.public_view(unlock.password.as_deref())))
        .ok_or_else(|| AppError::NotFound("Release".to_string()))
}
