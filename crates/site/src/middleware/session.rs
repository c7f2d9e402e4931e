//! Session middleware configuration.
//!
//! Admin sessions use tower-sessions with a server-side store: the
//! cookie only carries an opaque id. `PostgreSQL` is used when a database
//! is configured, an in-memory store otherwise.

use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::config::SiteConfig;

/// Session cookie name for the admin console.
pub const SESSION_COOKIE_NAME: &str = "admin_session";

/// Create the session layer over `store`.
///
/// The cookie is HTTP-only, `SameSite=Lax`, scoped to `/`, and `Secure`
/// when the base URL is https. Expiry is set per-session at login.
#[must_use]
pub fn create_session_layer<S>(store: S, config: &SiteConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
