#![allow(clippy::unwrap_used)]

mod common;

use serde_json::{Value, json};

use common::{PASSWORD, TestSite, USERNAME, login};

#[tokio::test]
async fn login_sets_session_cookie() {
    let site = TestSite::in_memory();
    let server = site.server();

    let response = login(&server).await;
    response.assert_status_ok();
    response.assert_json(&json!({"success": true}));

    let cookie = response.cookie("admin_session");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.path(), Some("/"));

    let status: Value = server.get("/api/admin/session").await.json();
    assert_eq!(status, json!({"authenticated": true, "username": USERNAME}));
}

#[tokio::test]
async fn login_rejects_wrong_credentials() {
    let site = TestSite::in_memory();
    let server = site.server();

    for (username, password) in [(USERNAME, "not the password"), ("someone", PASSWORD), ("", "")] {
        let response = server
            .post("/api/admin/login")
            .json(&json!({"username": username, "password": password}))
            .await;
        response.assert_status_unauthorized();
        let body: Value = response.json();
        assert_eq!(body["error"], json!("Unauthorized"));
    }

    let status: Value = server.get("/api/admin/session").await.json();
    assert_eq!(status, json!({"authenticated": false}));
}

#[tokio::test]
async fn login_requires_json_body() {
    let site = TestSite::in_memory();
    let server = site.server();

    let response = server
        .post("/api/admin/login")
        .json(&json!({"username": USERNAME}))
        .await;
    response.assert_status_bad_request();
    assert!(response.json::<Value>()["error"].is_string());
}

#[tokio::test]
async fn unauthenticated_writes_change_nothing() {
    let site = TestSite::in_memory();
    site.seed("about", json!({"bio": "original"})).await;
    let server = site.server();

    server
        .put("/api/admin/about")
        .json(&json!({"bio": "defaced"}))
        .await
        .assert_status_unauthorized();
    server
        .patch("/api/admin/content/about")
        .json(&json!({"bio": "defaced"}))
        .await
        .assert_status_unauthorized();
    server
        .post("/api/admin/media/photos")
        .json(&json!({"url": "/x.jpg"}))
        .await
        .assert_status_unauthorized();
    server
        .put("/api/admin/orders")
        .json(&json!({"id": "1", "status": "shipped"}))
        .await
        .assert_status_unauthorized();

    assert_eq!(site.stored("about").await, Some(json!({"bio": "original"})));
    assert_eq!(site.stored("media").await, None);
    assert_eq!(site.stored("orders").await, None);
}

#[tokio::test]
async fn unauthenticated_reads_are_rejected() {
    let site = TestSite::in_memory();
    let server = site.server();

    for path in [
        "/api/admin/orders",
        "/api/admin/messages",
        "/api/admin/analytics",
        "/api/admin/content/orders",
        "/api/admin/payment-config",
    ] {
        let response = server.get(path).await;
        response.assert_status_unauthorized();
        response.assert_json(&json!({"error": "Unauthorized"}));
    }
}

#[tokio::test]
async fn logout_revokes_session() {
    let site = TestSite::in_memory();
    let server = site.admin_server().await;

    server.get("/api/admin/orders").await.assert_status_ok();
    server
        .post("/api/admin/logout")
        .await
        .assert_json(&json!({"success": true}));

    server.get("/api/admin/orders").await.assert_status_unauthorized();
    let status: Value = server.get("/api/admin/session").await.json();
    assert_eq!(status["authenticated"], json!(false));
}
