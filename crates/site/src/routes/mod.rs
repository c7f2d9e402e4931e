//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Store readiness check
//! GET  /uploads/*                       - Uploaded files
//!
//! # Admin auth
//! POST /api/admin/login                 - Start an admin session
//! POST /api/admin/logout                - Revoke the session
//! GET  /api/admin/session               - Session status
//!
//! # Admin content (requires admin)
//! GET|PUT|PATCH /api/admin/content/{key}
//! GET|PUT|PATCH /api/admin/{about,homepage,socials,payment-config,site-config,products,shows,music}
//! GET|PUT /api/admin/visibility
//! GET  /api/admin/analytics
//!
//! # Admin records (requires admin)
//! GET    /api/admin/media
//! POST   /api/admin/media/{bucket}
//! DELETE /api/admin/media/{bucket}/{id}
//! GET|PUT /api/admin/orders
//! GET    /api/admin/orders/{id}
//! GET    /api/admin/messages
//! PATCH|DELETE /api/admin/messages/{id}
//! POST   /api/admin/upload
//!
//! # Public
//! GET  /api/public/content/{key}
//! GET  /api/public/{about,homepage,socials,site-config,visibility,media,products,shows,payment-config,music}
//! GET  /api/public/music/{idOrSlug}?password=
//! POST /api/public/orders
//! GET  /api/public/orders/{id}?email=
//! POST /api/public/messages
//! POST /api/public/analytics
//! ```

pub mod admin;
pub mod auth;
pub mod public;

use axum::Router;

use crate::config::SiteConfig;
use crate::state::AppState;

/// Create all API routes.
pub fn routes(config: &SiteConfig) -> Router<AppState> {
    Router::new()
        .nest("/api/admin", admin::routes(config.upload.max_bytes))
        .nest("/api/public", public::routes())
}
