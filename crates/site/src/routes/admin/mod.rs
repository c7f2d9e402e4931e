//! Admin console API, mounted at `/api/admin`.
//!
//! Every handler except login, logout and session takes [`RequireAdmin`]
//! as its first extractor, so an unauthenticated request is rejected with
//! 401 before its body is read and nothing is changed.
//!
//! [`RequireAdmin`]: crate::middleware::RequireAdmin

pub mod content;
pub mod records;
pub mod upload;

use axum::Router;

use crate::routes::auth;
use crate::state::AppState;

/// Build the admin router.
pub fn routes(upload_max_bytes: usize) -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(content::router())
        .merge(records::router())
        .merge(upload::router(upload_max_bytes))
}
