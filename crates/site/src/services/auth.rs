//! Admin authentication.
//!
//! There is one admin account, configured through the environment with an
//! Argon2 password hash. Nothing about it is stored in the content store.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::AdminCredentials;

/// Minimum password length accepted by [`hash_password`].
pub const MIN_PASSWORD_LENGTH: usize = 12;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong username or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password too weak to hash for admin use.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

/// Check a login attempt against the configured admin.
///
/// The Argon2 verification runs even when the username is wrong, so the
/// response time does not reveal which part was incorrect.
#[must_use]
pub fn validate_credentials(admin: &AdminCredentials, username: &str, password: &str) -> bool {
    let password_ok = verify_password(password, admin.password_hash.expose_secret()).is_ok();
    let username_ok = constant_time_eq(username.as_bytes(), admin.username.as_bytes());
    password_ok && username_ok
}

/// Hash a password using Argon2id for `BACKLINE_ADMIN_PASSWORD_HASH`.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if shorter than [`MIN_PASSWORD_LENGTH`],
/// `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
