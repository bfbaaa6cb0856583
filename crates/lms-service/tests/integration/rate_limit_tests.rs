//! E2E tests for the failed-login limiter.
//!
//! Clients are told apart by `X-Forwarded-For`, so each test picks its own
//! addresses and never depends on the loopback peer address.

use common::types::Role;
use lms_test_utils::{
    test_config, TestLmsServer, TEST_CLIENT_IP_1, TEST_CLIENT_IP_2, TEST_PASSWORD,
};
use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

async fn login_from(
    client: &reqwest::Client,
    server: &TestLmsServer,
    ip: &str,
    password: &str,
) -> Result<reqwest::Response, anyhow::Error> {
    Ok(client
        .post(format!("{}/api/lms/login", server.url()))
        .header("X-Forwarded-For", ip)
        .json(&json!({"username": "alice", "password": password}))
        .send()
        .await?)
}

#[tokio::test]
async fn test_sixth_attempt_is_rejected_with_retry_after() -> Result<(), anyhow::Error> {
    let server = TestLmsServer::spawn().await?;
    server
        .create_user("alice", TEST_PASSWORD, Role::Student)
        .await?;
    let client = reqwest::Client::new();

    for attempt in 1..=5 {
        let response = login_from(&client, &server, TEST_CLIENT_IP_1, "wrong").await?;
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "Attempt {} should be a plain credential failure",
            attempt
        );
    }

    // Blocked even with the correct password.
    let response = login_from(&client, &server, TEST_CLIENT_IP_1, TEST_PASSWORD).await?;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let retry_after: u64 = response
        .headers()
        .get(RETRY_AFTER)
        .expect("429 must carry Retry-After")
        .to_str()?
        .parse()?;
    assert!(
        (1..=60).contains(&retry_after),
        "Retry-After should be within the window, got {}",
        retry_after
    );

    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "TOO_MANY_ATTEMPTS");

    Ok(())
}

#[tokio::test]
async fn test_limit_is_per_client() -> Result<(), anyhow::Error> {
    let server = TestLmsServer::spawn().await?;
    server
        .create_user("alice", TEST_PASSWORD, Role::Student)
        .await?;
    let client = reqwest::Client::new();

    for _ in 0..5 {
        login_from(&client, &server, TEST_CLIENT_IP_1, "wrong").await?;
    }
    let blocked = login_from(&client, &server, TEST_CLIENT_IP_1, TEST_PASSWORD).await?;
    assert_eq!(blocked.status(), StatusCode::TOO_MANY_REQUESTS);

    let other = login_from(&client, &server, TEST_CLIENT_IP_2, TEST_PASSWORD).await?;
    assert_eq!(other.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_successful_login_resets_failures() -> Result<(), anyhow::Error> {
    let server = TestLmsServer::spawn().await?;
    server
        .create_user("alice", TEST_PASSWORD, Role::Student)
        .await?;
    let client = reqwest::Client::new();

    for _ in 0..4 {
        login_from(&client, &server, TEST_CLIENT_IP_1, "wrong").await?;
    }
    let ok = login_from(&client, &server, TEST_CLIENT_IP_1, TEST_PASSWORD).await?;
    assert_eq!(ok.status(), StatusCode::OK);

    // A fresh budget of five failures.
    for _ in 0..5 {
        let response = login_from(&client, &server, TEST_CLIENT_IP_1, "wrong").await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
    let blocked = login_from(&client, &server, TEST_CLIENT_IP_1, "wrong").await?;
    assert_eq!(blocked.status(), StatusCode::TOO_MANY_REQUESTS);

    Ok(())
}

#[tokio::test]
async fn test_block_lifts_when_window_expires() -> Result<(), anyhow::Error> {
    let mut config = test_config();
    config.rate_limit_max_attempts = 2;
    config.rate_limit_window_seconds = 1;
    let server = TestLmsServer::spawn_with(config).await?;
    server
        .create_user("alice", TEST_PASSWORD, Role::Student)
        .await?;
    let client = reqwest::Client::new();

    for _ in 0..2 {
        login_from(&client, &server, TEST_CLIENT_IP_1, "wrong").await?;
    }
    let blocked = login_from(&client, &server, TEST_CLIENT_IP_1, TEST_PASSWORD).await?;
    assert_eq!(blocked.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        blocked
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok()),
        Some("1")
    );

    tokio::time::sleep(Duration::from_millis(1200)).await;

    let response = login_from(&client, &server, TEST_CLIENT_IP_1, TEST_PASSWORD).await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

/// Successful logins never count against the limit.
#[tokio::test]
async fn test_repeated_successful_logins_are_not_limited() -> Result<(), anyhow::Error> {
    let server = TestLmsServer::spawn().await?;
    server
        .create_user("alice", TEST_PASSWORD, Role::Student)
        .await?;
    let client = reqwest::Client::new();

    for _ in 0..8 {
        let response = login_from(&client, &server, TEST_CLIENT_IP_1, TEST_PASSWORD).await?;
        assert_eq!(response.status(), StatusCode::OK);
    }

    Ok(())
}
