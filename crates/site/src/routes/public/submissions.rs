//! Public write endpoints: checkout, order tracking, contact form and analytics.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use backline_core::order::Order;
use backline_core::types::MessageId;

use crate::error::{AppError, Result};
use crate::extract::{JsonBody, QueryParams};
use crate::services::{analytics, messages, orders};
use crate::state::AppState;

/// Build the submissions router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", post(place_order))
        .route("/orders/{id}", get(track_order))
        .route("/messages", post(send_message))
        .route("/analytics", post(track_event))
}

/// POST /api/public/orders
async fn place_order(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = orders::place_order(state.store(), body, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Query parameters for order tracking.
#[derive(Debug, Deserialize)]
pub struct TrackQuery {
    #[serde(default)]
    pub email: Option<String>,
}

/// GET /api/public/orders/{id}?email=
async fn track_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    QueryParams(query): QueryParams<TrackQuery>,
) -> Result<Json<Order>> {
    let email = query
        .email
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;
    orders::track_order(state.store(), &id, &email).await.map(Json)
}

/// Contact form acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageReceived {
    pub success: bool,
    pub id: MessageId,
}

/// POST /api/public/messages
async fn send_message(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> Result<(StatusCode, Json<MessageReceived>)> {
    let id = messages::submit(state.store(), body, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(MessageReceived { success: true, id })))
}

/// Record an event. Always answers `{success: true}`, whatever the body.
///
/// POST /api/public/analytics
async fn track_event(State(state): State<AppState>, body: Bytes) -> Json<Value> {
    if let Ok(event) = serde_json::from_slice::<Value>(&body) {
        analytics::track(state.store(), &event, Utc::now()).await;
    }
    Json(serde_json::json!({ "success": true }))
}
