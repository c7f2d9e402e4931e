//! Admin login, logout and session status.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_sessions::{
    Expiry, Session,
    cookie::time::{Duration, OffsetDateTime},
};

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::extract::JsonBody;
use crate::middleware::OptionalAdmin;
use crate::models::{CurrentAdmin, session_keys};
use crate::models::session::SESSION_LIFETIME_HOURS;
use crate::services::auth::validate_credentials;
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/session", get(session_status))
}

/// Login request body.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Generic success response.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Session status response.
#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

fn session_error(e: &tower_sessions::session::Error) -> AppError {
    AppError::Internal(format!("session error: {e}"))
}

/// Check credentials and start a 24 hour admin session.
///
/// POST /api/admin/login
async fn login(
    session: Session,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<SuccessResponse>> {
    let admin = state.config().admin.clone();
    let LoginRequest { username, password } = body;
    let attempted = username.clone();

    // Argon2 verification blocks for tens of milliseconds
    let valid = tokio::task::spawn_blocking(move || {
        validate_credentials(&admin, &username, &password)
    })
    .await
    .map_err(|e| AppError::Internal(format!("credential check failed: {e}")))?;

    if !valid {
        tracing::warn!(username = %attempted, "Failed admin login");
        return Err(AppError::Unauthorized("invalid credentials".to_string()));
    }

    session.cycle_id().await.map_err(|e| session_error(&e))?;
    session
        .insert(
            session_keys::CURRENT_ADMIN,
            CurrentAdmin::new(attempted.clone(), Utc::now()),
        )
        .await
        .map_err(|e| session_error(&e))?;
    session.set_expiry(Some(Expiry::AtDateTime(
        OffsetDateTime::now_utc() + Duration::hours(SESSION_LIFETIME_HOURS),
    )));

    set_sentry_user(&attempted);
    tracing::info!(username = %attempted, "Admin logged in");
    Ok(Json(SuccessResponse { success: true }))
}

/// Revoke the session.
///
/// POST /api/admin/logout
async fn logout(session: Session) -> Result<Json<SuccessResponse>> {
    session.flush().await.map_err(|e| session_error(&e))?;
    clear_sentry_user();
    Ok(Json(SuccessResponse { success: true }))
}

/// Whether the caller holds a live admin session.
///
/// GET /api/admin/session
async fn session_status(OptionalAdmin(admin): OptionalAdmin) -> Json<SessionStatus> {
    Json(SessionStatus {
        authenticated: admin.is_some(),
        username: admin.map(|a| a.username),
    })
}
