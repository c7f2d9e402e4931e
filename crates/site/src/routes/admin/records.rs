//! Admin handlers for media items, orders and contact messages.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use backline_core::content::ContentKey;
use backline_core::media::MediaItem;
use backline_core::order::Order;
use backline_core::types::OrderStatus;

use crate::error::Result;
use crate::extract::{JsonBody, QueryParams};
use crate::middleware::RequireAdmin;
use crate::services::{content, media, messages, orders};
use crate::state::AppState;

/// Build the records router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/media", get(list_media))
        .route("/media/{bucket}", post(add_media))
        .route("/media/{bucket}/{id}", delete(remove_media))
        .route("/orders", get(list_orders).put(update_order))
        .route("/orders/{id}", get(show_order))
        .route("/messages", get(list_messages))
        .route("/messages/{id}", patch(mark_message).delete(delete_message))
}

/// GET /api/admin/media
async fn list_media(_admin: RequireAdmin, State(state): State<AppState>) -> Result<Json<Value>> {
    content::get(state.store(), ContentKey::Media.as_str())
        .await
        .map(Json)
}

/// POST /api/admin/media/{bucket}
async fn add_media(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(bucket): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> Result<(StatusCode, Json<MediaItem>)> {
    let bucket = media::parse_bucket(&bucket)?;
    let item = media::add(state.store(), bucket, body, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// DELETE /api/admin/media/{bucket}/{id}
async fn remove_media(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path((bucket, id)): Path<(String, String)>,
) -> Result<StatusCode> {
    let bucket = media::parse_bucket(&bucket)?;
    media::remove(state.store(), bucket, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Query parameters for the order list.
#[derive(Debug, Deserialize)]
pub struct OrderFilter {
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

/// GET /api/admin/orders
async fn list_orders(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<OrderFilter>,
) -> Result<Json<Vec<Order>>> {
    orders::list_orders(state.store(), filter.status)
        .await
        .map(Json)
}

/// GET /api/admin/orders/{id}
async fn show_order(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>> {
    orders::find_order(state.store(), &id).await.map(Json)
}

/// PUT /api/admin/orders
async fn update_order(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> Result<Json<Order>> {
    let order = orders::update_order(state.store(), body, Utc::now()).await?;
    tracing::debug!(order_id = %order.id, admin = %admin.username, "Order edited");
    Ok(Json(order))
}

/// GET /api/admin/messages
async fn list_messages(_admin: RequireAdmin, State(state): State<AppState>) -> Result<Json<Value>> {
    messages::list(state.store()).await.map(Json)
}

/// PATCH /api/admin/messages/{id}
async fn mark_message(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> Result<Json<Value>> {
    messages::mark(state.store(), &id, body).await.map(Json)
}

/// DELETE /api/admin/messages/{id}
async fn delete_message(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    messages::delete(state.store(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
