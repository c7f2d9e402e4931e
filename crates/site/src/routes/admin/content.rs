//! Admin content document handlers.
//!
//! The named domains share the generic handlers through [`named`], which
//! fixes the key instead of reading it from the path.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{MethodRouter, get},
};
use serde_json::Value;

use backline_core::content::ContentKey;

use crate::error::Result;
use crate::extract::JsonBody;
use crate::middleware::RequireAdmin;
use crate::services::content;
use crate::state::AppState;

/// Domains editable under their own path (`/api/admin/<key>`).
const NAMED: [ContentKey; 8] = [
    ContentKey::About,
    ContentKey::Homepage,
    ContentKey::Socials,
    ContentKey::PaymentConfig,
    ContentKey::SiteConfig,
    ContentKey::Products,
    ContentKey::Shows,
    ContentKey::Music,
];

/// Build the content router.
pub fn router() -> Router<AppState> {
    let router = Router::new()
        .route(
            "/content/{key}",
            get(get_content).put(put_content).patch(patch_content),
        )
        .route(
            "/visibility",
            get(|admin: RequireAdmin, state: State<AppState>| {
                read(admin, state, ContentKey::Visibility)
            })
            .put(|admin: RequireAdmin, state: State<AppState>, body: JsonBody<Value>| {
                write(admin, state, ContentKey::Visibility, body)
            }),
        )
        .route(
            "/analytics",
            get(|admin: RequireAdmin, state: State<AppState>| {
                read(admin, state, ContentKey::Analytics)
            }),
        );

    NAMED.into_iter().fold(router, |router, key| {
        router.route(&format!("/{key}"), named(key))
    })
}

fn named(key: ContentKey) -> MethodRouter<AppState> {
    get(move |admin: RequireAdmin, state: State<AppState>| read(admin, state, key))
        .put(move |admin: RequireAdmin, state: State<AppState>, body: JsonBody<Value>| {
            write(admin, state, key, body)
        })
        .patch(move |admin: RequireAdmin, state: State<AppState>, body: JsonBody<Value>| {
            merge(admin, state, key, body)
        })
}

async fn read(_admin: RequireAdmin, State(state): State<AppState>, key: ContentKey) -> Result<Json<Value>> {
    content::get(state.store(), key.as_str()).await.map(Json)
}

async fn write(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    key: ContentKey,
    JsonBody(body): JsonBody<Value>,
) -> Result<Json<Value>> {
    content::replace(state.store(), key.as_str(), body).await.map(Json)
}

async fn merge(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    key: ContentKey,
    JsonBody(body): JsonBody<Value>,
) -> Result<Json<Value>> {
    content::patch(state.store(), key.as_str(), body).await.map(Json)
}

/// GET /api/admin/content/{key}
async fn get_content(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Value>> {
    content::get(state.store(), &key).await.map(Json)
}

/// PUT /api/admin/content/{key}
async fn put_content(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(key): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> Result<Json<Value>> {
    content::replace(state.store(), &key, body).await.map(Json)
}

/// PATCH /api/admin/content/{key}
async fn patch_content(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(key): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> Result<Json<Value>> {
    content::patch(state.store(), &key, body).await.map(Json)
}
