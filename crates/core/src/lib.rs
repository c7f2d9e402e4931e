//! Backline Core - Shared domain types for the band site.
//!
//! This crate provides the types used by both Backline components:
//! - `site` - HTTP server for the public site API and the admin console API
//! - `cli` - Command-line tools for migrations, seeding and password hashing
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP. Everything here operates on `serde_json`
//! values or typed records parsed from them.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, emails, and statuses
//! - [`content`] - Content keys, default documents, and the one-level merge
//! - [`visibility`] - Page/section/element visibility tree
//! - [`release`] - Music releases and password-gated public views
//! - [`order`] - Orders, checkout validation, and catalog pricing
//! - [`cart`] - Client-held cart
//! - [`media`] - Media library buckets
//! - [`message`] - Contact form messages
//! - [`analytics`] - Capped event log
//! - [`validation`] - Declarative field validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod analytics;
pub mod cart;
pub mod content;
pub mod media;
pub mod message;
pub mod order;
pub mod release;
pub mod types;
pub mod validation;
pub mod visibility;

pub use types::*;
