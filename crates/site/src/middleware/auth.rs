//! Authentication extractors for the admin API.

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::Utc;
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{CurrentAdmin, session_keys};

/// Extractor that requires an authenticated, unexpired admin session.
///
/// Rejects with 401 JSON otherwise. Handlers take it as their first
/// argument so the rejection happens before the body is read.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
///     format!("Hello, {}!", admin.username)
/// }
/// ```
pub struct RequireAdmin(pub CurrentAdmin);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Unauthorized("no session".to_string()))?;

        let admin: CurrentAdmin = session
            .get(session_keys::CURRENT_ADMIN)
            .await
            .map_err(|e| AppError::Internal(format!("session store error: {e}")))?
            .ok_or_else(|| AppError::Unauthorized("not logged in".to_string()))?;

        if admin.is_expired(Utc::now()) {
            if let Err(e) = session.flush().await {
                tracing::warn!(error = %e, "Failed to flush expired session");
            }
            return Err(AppError::Unauthorized("session expired".to_string()));
        }

        Ok(Self(admin))
    }
}

/// Extractor that optionally gets the current admin.
///
/// Unlike `RequireAdmin`, this does not reject the request. Expired
/// logins read as `None`.
pub struct OptionalAdmin(pub Option<CurrentAdmin>);

impl<S> FromRequestParts<S> for OptionalAdmin
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
                .await
                .ok()
                .flatten()
                .filter(|admin| !admin.is_expired(Utc::now())),
            None => None,
        };

        Ok(Self(admin))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::{Router, routing::get};
    use axum_test::TestServer;
    use chrono::Duration;
    use tower_sessions::session::{Id, Record};
    use tower_sessions::session_store::{self, SessionStore};
    use tower_sessions::{MemoryStore, SessionManagerLayer};

    use super::*;

    async fn sign_in(session: Session, hours_ago: i64) -> &'static str {
        let admin = CurrentAdmin::new("band", Utc::now() - Duration::hours(hours_ago));
        session.insert(session_keys::CURRENT_ADMIN, admin).await.unwrap();
        "signed in"
    }

    fn server() -> TestServer {
        let app = Router::new()
            .route("/fresh", get(|session: Session| sign_in(session, 1)))
            .route("/stale", get(|session: Session| sign_in(session, 25)))
            .route(
                "/guarded",
                get(|RequireAdmin(admin): RequireAdmin| async move { admin.username }),
            )
            .route(
                "/whoami",
                get(|OptionalAdmin(admin): OptionalAdmin| async move {
                    admin.map_or_else(|| "nobody".to_string(), |a| a.username)
                }),
            )
            .layer(SessionManagerLayer::new(MemoryStore::default()));
        TestServer::builder().save_cookies().build(app)
    }

    #[tokio::test]
    async fn test_require_admin_accepts_recent_login() {
        let server = server();
        server.get("/fresh").await.assert_status_ok();
        server.get("/guarded").await.assert_text("band");
        server.get("/whoami").await.assert_text("band");
    }

    #[tokio::test]
    async fn test_require_admin_rejects_expired_login() {
        let server = server();
        server.get("/stale").await.assert_status_ok();
        server.get("/whoami").await.assert_text("nobody");
        server.get("/guarded").await.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_require_admin_rejects_missing_login() {
        server().get("/guarded").await.assert_status_unauthorized();
    }

    #[derive(Debug)]
    struct UnreachableStore;

    #[async_trait::async_trait]
    impl SessionStore for UnreachableStore {
        async fn save(&self, _record: &Record) -> session_store::Result<()> {
            Err(session_store::Error::Backend("store offline".to_string()))
        }

        async fn load(&self, _id: &Id) -> session_store::Result<Option<Record>> {
            Err(session_store::Error::Backend("store offline".to_string()))
        }

        async fn delete(&self, _id: &Id) -> session_store::Result<()> {
            Err(session_store::Error::Backend("store offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_require_admin_reports_store_failure_as_server_error() {
        let session = Session::new(Some(Id::default()), Arc::new(UnreachableStore), None);
        let (mut parts, ()) = axum::http::Request::new(()).into_parts();
        parts.extensions.insert(session);

        let rejection = RequireAdmin::from_request_parts(&mut parts, &()).await.err();
        assert!(matches!(rejection, Some(AppError::Internal(_))));
    }
}
