//! Business logic for the site.
//!
//! Services take a `&dyn ContentStore` and plain values so they can be
//! exercised without HTTP. Each read-modify-write goes through
//! `ContentStore::update`.

pub mod analytics;
pub mod auth;
pub mod content;
pub mod media;
pub mod messages;
pub mod orders;
pub mod uploads;
