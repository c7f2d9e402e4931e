//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BACKLINE_BASE_URL` - Public URL of the site (https enables secure cookies)
//! - `BACKLINE_ADMIN_USERNAME` - Admin console username
//! - `BACKLINE_ADMIN_PASSWORD_HASH` - Argon2 PHC hash of the admin password
//!   (generate with `backline hash-password`)
//!
//! ## Optional
//! - `BACKLINE_DATABASE_URL` - `PostgreSQL` connection string (fallback: `DATABASE_URL`).
//!   Without it, content is stored as JSON files and sessions live in memory.
//! - `BACKLINE_DATA_DIR` - Directory for the file store (default: data)
//! - `BACKLINE_HOST` - Bind address (default: 127.0.0.1)
//! - `BACKLINE_PORT` - Listen port (default: 3000)
//! - `BACKLINE_UPLOAD_DIR` - Directory for uploaded files (default: public/uploads)
//! - `BACKLINE_UPLOAD_MAX_BYTES` - Largest accepted upload (default: 10 MiB)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sampling (default: 1.0 / 0.1)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use argon2::password_hash::PasswordHash;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Default upload limit (10 MiB).
pub const DEFAULT_UPLOAD_MAX_BYTES: usize = 10 * 1024 * 1024;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Where content documents are stored.
#[derive(Clone)]
pub enum StorageConfig {
    /// `content` table in `PostgreSQL`; sessions in the same database.
    Postgres { database_url: SecretString },
    /// JSON files in a directory; sessions in memory.
    File { data_dir: PathBuf },
}

impl StorageConfig {
    /// Postgres when `BACKLINE_DATABASE_URL` (or `DATABASE_URL`) is set,
    /// otherwise JSON files under `BACKLINE_DATA_DIR`.
    #[must_use]
    pub fn from_env() -> Self {
        match get_database_url("BACKLINE_DATABASE_URL") {
            Some(database_url) => Self::Postgres { database_url },
            None => Self::File {
                data_dir: PathBuf::from(get_env_or_default("BACKLINE_DATA_DIR", "data")),
            },
        }
    }
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Postgres { .. } => f
                .debug_struct("Postgres")
                .field("database_url", &"[REDACTED]")
                .finish(),
            Self::File { data_dir } => f.debug_struct("File").field("data_dir", data_dir).finish(),
        }
    }
}

/// The single admin account.
///
/// Implements `Debug` manually to redact the password hash.
#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    /// Argon2 PHC string.
    pub password_hash: SecretString,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// Upload handling settings.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory files are written to and served from.
    pub dir: PathBuf,
    /// Largest accepted file in bytes.
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("public/uploads"),
            max_bytes: DEFAULT_UPLOAD_MAX_BYTES,
        }
    }
}

/// Site application configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Content and session storage backend
    pub storage: StorageConfig,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the site
    pub base_url: String,
    /// Admin login
    pub admin: AdminCredentials,
    /// Upload settings
    pub upload: UploadConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. production, staging)
    pub sentry_environment: Option<String>,
    /// Error event sampling rate
    pub sentry_sample_rate: f32,
    /// Performance trace sampling rate
    pub sentry_traces_sample_rate: f32,
    /// Emit JSON logs instead of text
    pub log_json: bool,
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if the admin password hash is not an Argon2 PHC string.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let storage = StorageConfig::from_env();
        let host = get_env_or_default("BACKLINE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("BACKLINE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("BACKLINE_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("BACKLINE_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("BACKLINE_BASE_URL")?;

        let admin = AdminCredentials {
            username: get_required_env("BACKLINE_ADMIN_USERNAME")?,
            password_hash: get_password_hash("BACKLINE_ADMIN_PASSWORD_HASH")?,
        };
        if admin.username.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "BACKLINE_ADMIN_USERNAME".to_string(),
                "cannot be blank".to_string(),
            ));
        }

        let upload = UploadConfig {
            dir: PathBuf::from(get_env_or_default("BACKLINE_UPLOAD_DIR", "public/uploads")),
            max_bytes: get_optional_env("BACKLINE_UPLOAD_MAX_BYTES")
                .map(|v| {
                    v.parse::<usize>().map_err(|e| {
                        ConfigError::InvalidEnvVar(
                            "BACKLINE_UPLOAD_MAX_BYTES".to_string(),
                            e.to_string(),
                        )
                    })
                })
                .transpose()?
                .unwrap_or(DEFAULT_UPLOAD_MAX_BYTES),
        };

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);
        let log_json = get_optional_env("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json"));

        Ok(Self {
            storage,
            host,
            port,
            base_url,
            admin,
            upload,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
            log_json,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the site is served over HTTPS (cookies get the `Secure` flag).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Option<SecretString> {
    get_optional_env(primary_key)
        .or_else(|| get_optional_env("DATABASE_URL"))
        .filter(|url| !url.trim().is_empty())
        .map(SecretString::from)
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Load an Argon2 password hash and check that it parses.
fn get_password_hash(key: &str) -> Result<SecretString, ConfigError> {
    let value = SecretString::from(get_required_env(key)?);
    validate_password_hash(&value, key)?;
    Ok(value)
}

/// Reject anything that is not an Argon2 PHC string, including plaintext passwords.
fn validate_password_hash(hash: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let parsed = PasswordHash::new(hash.expose_secret()).map_err(|_| {
        ConfigError::InsecureSecret(
            var_name.to_string(),
            "must be an Argon2 PHC string (run `backline hash-password`)".to_string(),
        )
    })?;

    if !parsed.algorithm.as_str().starts_with("argon2") {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("unsupported algorithm '{}', expected argon2", parsed.algorithm),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHRzYWx0$WHb6EWptBnuWQnMIZ2t4zXqF2ZlX1bsdKMXBAn6Kdzk";

    fn config(base_url: &str) -> SiteConfig {
        SiteConfig {
            storage: StorageConfig::File {
                data_dir: PathBuf::from("data"),
            },
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: base_url.to_string(),
            admin: AdminCredentials {
                username: "band".to_string(),
                password_hash: SecretString::from(HASH),
            },
            upload: UploadConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
            log_json: false,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = config("http://localhost:3000").socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_secure_follows_base_url() {
        assert!(!config("http://localhost:3000").is_secure());
        assert!(config("https://theband.example").is_secure());
    }

    #[test]
    fn test_validate_password_hash_accepts_phc() {
        assert!(validate_password_hash(&SecretString::from(HASH), "TEST").is_ok());
    }

    #[test]
    fn test_validate_password_hash_rejects_plaintext() {
        let err = validate_password_hash(&SecretString::from("hunter2"), "TEST").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = config("http://localhost:3000");
        config.storage = StorageConfig::Postgres {
            database_url: SecretString::from("postgres://band:pw-in-url@db/site"),
        };
        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("band"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("pw-in-url"));
        assert!(!debug_output.contains("argon2id"));
    }
}
