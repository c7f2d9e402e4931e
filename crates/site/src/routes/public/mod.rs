//! Public site API, mounted at `/api/public`. No authentication.

pub mod content;
pub mod submissions;

use axum::Router;

use crate::state::AppState;

/// Build the public router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(content::router())
        .merge(submissions::router())
}
