//! Integration tests for the operational endpoints and for behavior when
//! the shared store is down.

use common::types::Role;
use lms_service::store::UnavailableStore;
use lms_test_utils::{test_config, TestLmsServer, TEST_PASSWORD};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;

async fn server_without_store() -> Result<TestLmsServer, anyhow::Error> {
    TestLmsServer::spawn_with_store(test_config(), Arc::new(UnavailableStore)).await
}

// ============================================================================
// Liveness and readiness
// ============================================================================

#[tokio::test]
async fn test_health_endpoint_returns_ok() -> Result<(), anyhow::Error> {
    let server = TestLmsServer::spawn().await?;

    let response = reqwest::get(format!("{}/health", server.url())).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await?, "OK");
    Ok(())
}

#[tokio::test]
async fn test_ready_endpoint_returns_ok_when_healthy() -> Result<(), anyhow::Error> {
    let server = TestLmsServer::spawn().await?;

    let response = reqwest::get(format!("{}/ready", server.url())).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["database"], "healthy");
    assert_eq!(body["store"], "healthy");
    assert!(body.get("error").is_none());
    Ok(())
}

#[tokio::test]
async fn test_ready_returns_503_when_store_unavailable() -> Result<(), anyhow::Error> {
    let server = server_without_store().await?;

    let response = reqwest::get(format!("{}/ready", server.url())).await?;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json().await?;
    assert_eq!(body["status"], "not_ready");
    assert_eq!(body["database"], "healthy");
    assert_eq!(body["store"], "unhealthy");
    assert_eq!(body["error"], "Service dependencies unavailable");

    // Liveness is unaffected.
    let response = reqwest::get(format!("{}/health", server.url())).await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_ready_returns_503_when_database_closed() -> Result<(), anyhow::Error> {
    let server = TestLmsServer::spawn().await?;
    server.pool().close().await;

    let response = reqwest::get(format!("{}/ready", server.url())).await?;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json().await?;
    assert_eq!(body["database"], "unhealthy");
    Ok(())
}

// ============================================================================
// Store outage
// ============================================================================

/// Login fails closed: no token is issued without a rate limit decision.
#[tokio::test]
async fn test_login_returns_503_when_store_unavailable() -> Result<(), anyhow::Error> {
    let server = server_without_store().await?;
    server
        .create_user("alice", TEST_PASSWORD, Role::Student)
        .await?;

    let response = reqwest::Client::new()
        .post(format!("{}/api/lms/login", server.url()))
        .json(&json!({"username": "alice", "password": TEST_PASSWORD}))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "STORE_UNAVAILABLE");
    assert!(
        !body.to_string().contains("unreachable"),
        "Store details must not leak to clients"
    );
    Ok(())
}

#[tokio::test]
async fn test_course_list_returns_503_when_store_unavailable() -> Result<(), anyhow::Error> {
    let server = server_without_store().await?;
    let token = server.token_for("alice", Role::Student).await?;

    let response = reqwest::Client::new()
        .get(format!("{}/api/lms/courses", server.url()))
        .bearer_auth(token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    Ok(())
}

/// Endpoints that never touch the store keep working.
#[tokio::test]
async fn test_store_outage_leaves_other_endpoints_working() -> Result<(), anyhow::Error> {
    let server = server_without_store().await?;
    let token = server.token_for("root", Role::Admin).await?;

    let response = reqwest::Client::new()
        .get(format!("{}/api/lms/users", server.url()))
        .bearer_auth(token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

// ============================================================================
// Metrics
// ============================================================================

#[tokio::test]
async fn test_metrics_endpoint_is_unauthenticated() -> Result<(), anyhow::Error> {
    let server = TestLmsServer::spawn().await?;

    // Generate some traffic first.
    reqwest::get(format!("{}/health", server.url())).await?;

    let response = reqwest::get(format!("{}/metrics", server.url())).await?;

    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}
