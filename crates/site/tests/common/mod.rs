//! Shared fixtures for the HTTP tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::{Arc, LazyLock};

use axum_test::TestServer;
use secrecy::SecretString;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower_sessions::MemoryStore;

use backline_site::config::{AdminCredentials, SiteConfig, StorageConfig, UploadConfig};
use backline_site::db::{ContentStore, FileContentStore, MemoryContentStore};
use backline_site::services::auth::hash_password;
use backline_site::state::AppState;

pub const USERNAME: &str = "band";
pub const PASSWORD: &str = "correct horse battery staple";

/// Hashing is slow in debug builds, so every test shares one hash.
static PASSWORD_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password(PASSWORD).expect("hash test password"));

pub struct TestSite {
    pub store: Arc<dyn ContentStore>,
    pub uploads: TempDir,
    data: Option<TempDir>,
    config: SiteConfig,
}

impl TestSite {
    /// Site over an in-memory content store.
    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(MemoryContentStore::new()), None, 10 * 1024 * 1024)
    }

    /// Site over a file store in a temporary directory.
    pub async fn on_disk() -> Self {
        let data = tempfile::tempdir().expect("create data dir");
        let store = FileContentStore::open(data.path())
            .await
            .expect("open file store");
        Self::with_store(Arc::new(store), Some(data), 10 * 1024 * 1024)
    }

    /// Site with a small upload limit.
    pub fn with_upload_limit(max_bytes: usize) -> Self {
        Self::with_store(Arc::new(MemoryContentStore::new()), None, max_bytes)
    }

    fn with_store(store: Arc<dyn ContentStore>, data: Option<TempDir>, max_bytes: usize) -> Self {
        let uploads = tempfile::tempdir().expect("create upload dir");
        let data_dir = data
            .as_ref()
            .map_or_else(|| "unused".into(), |d| d.path().to_path_buf());

        let config = SiteConfig {
            storage: StorageConfig::File { data_dir },
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            base_url: "http://localhost:3000".to_string(),
            admin: AdminCredentials {
                username: USERNAME.to_string(),
                password_hash: SecretString::from(PASSWORD_HASH.clone()),
            },
            upload: UploadConfig {
                dir: uploads.path().to_path_buf(),
                max_bytes,
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
            log_json: false,
        };

        Self {
            store,
            uploads,
            data,
            config,
        }
    }

    fn router(&self) -> axum::Router {
        let state = AppState::new(self.config.clone(), Arc::clone(&self.store));
        backline_site::app(state, MemoryStore::default())
    }

    /// Server that saves cookies between requests.
    pub fn server(&self) -> TestServer {
        TestServer::builder()
            .save_cookies()
            .build(self.router())
    }

    /// Server already logged in as the admin.
    pub async fn admin_server(&self) -> TestServer {
        let server = self.server();
        login(&server).await.assert_status_ok();
        server
    }

    /// Seed a document directly in the store.
    pub async fn seed(&self, key: &str, value: Value) {
        self.store.write(key, &value).await.expect("seed document");
    }

    pub async fn stored(&self, key: &str) -> Option<Value> {
        self.store.read(key).await.expect("read document")
    }
}

pub async fn login(server: &TestServer) -> axum_test::TestResponse {
    server
        .post("/api/admin/login")
        .json(&json!({"username": USERNAME, "password": PASSWORD}))
        .await
}

/// A catalog with one untracked and one low-stock product.
pub fn products() -> Value {
    json!([
        {"id": "tee", "name": "Tour Tee", "price": "25.00", "sizes": ["S", "M", "L"]},
        {"id": "lp", "name": "Debut LP", "price": "30.00", "stock": 1},
        {"id": "old-tee", "name": "Last Tour Tee", "price": "20.00", "available": false}
    ])
}

pub fn checkout_body() -> Value {
    json!({
        "customer": {
            "name": "Sam Fan",
            "email": "sam@example.com",
            "address": {
                "line1": "1 High St",
                "city": "Leeds",
                "postalCode": "LS1 1AA",
                "country": "GB"
            }
        },
        "items": [
            {"productId": "tee", "quantity": 2, "variant": "M"},
            {"productId": "lp", "quantity": 1}
        ],
        "shippingMethod": "standard",
        "subtotal": "80.00",
        "total": "85.00"
    })
}
