//! E2E tests for registration and login.
//!
//! ## Test Naming
//!
//! Tests follow the convention: `test_<feature>_<scenario>_<expected_result>`

use common::types::Role;
use lms_test_utils::{TestLmsServer, TokenAssertions, TEST_PASSWORD};
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn login(
    client: &reqwest::Client,
    server: &TestLmsServer,
    username: &str,
    password: &str,
) -> Result<reqwest::Response, anyhow::Error> {
    Ok(client
        .post(format!("{}/api/lms/login", server.url()))
        .json(&json!({"username": username, "password": password}))
        .send()
        .await?)
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_happy_path_returns_201() -> Result<(), anyhow::Error> {
    let server = TestLmsServer::spawn().await?;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/lms/register", server.url()))
        .json(&json!({
            "username": "alice",
            "password": "s3cret-pass",
            "email": "alice@kampus.ac.id",
            "role": "mahasiswa"
        }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await?;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@kampus.ac.id");
    assert_eq!(body["role"], "mahasiswa");
    assert!(body["id"].as_i64().is_some());
    assert!(
        body.get("password_hash").is_none(),
        "Response must not expose the password hash"
    );

    Ok(())
}

#[tokio::test]
async fn test_register_accepts_role_alias() -> Result<(), anyhow::Error> {
    let server = TestLmsServer::spawn().await?;

    let response = reqwest::Client::new()
        .post(format!("{}/api/lms/register", server.url()))
        .json(&json!({"username": "budi", "password": "pw", "role": "instructor"}))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await?;
    assert_eq!(body["role"], "dosen");

    Ok(())
}

#[tokio::test]
async fn test_register_duplicate_username_returns_400() -> Result<(), anyhow::Error> {
    let server = TestLmsServer::spawn().await?;
    server
        .create_user("alice", TEST_PASSWORD, Role::Student)
        .await?;

    let response = reqwest::Client::new()
        .post(format!("{}/api/lms/register", server.url()))
        .json(&json!({"username": "alice", "password": "other", "role": "dosen"}))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["message"], "Username already exists");

    Ok(())
}

#[tokio::test]
async fn test_register_unknown_role_returns_400() -> Result<(), anyhow::Error> {
    let server = TestLmsServer::spawn().await?;

    let response = reqwest::Client::new()
        .post(format!("{}/api/lms/register", server.url()))
        .json(&json!({"username": "mallory", "password": "pw", "role": "superuser"}))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["message"], "Invalid role");

    Ok(())
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_returns_token_with_role_claim() -> Result<(), anyhow::Error> {
    let server = TestLmsServer::spawn().await?;
    let user = server
        .create_user("pak_budi", TEST_PASSWORD, Role::Instructor)
        .await?;
    let client = reqwest::Client::new();

    let response = login(&client, &server, "pak_budi", TEST_PASSWORD).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["role"], "dosen");
    assert_eq!(body["expires_in"], 3600);

    let token = body["access_token"]
        .as_str()
        .expect("Should have access_token")
        .to_string();
    token
        .assert_valid_jwt()
        .assert_has_role("dosen")
        .assert_for_user(user.id, "pak_budi")
        .assert_lifetime_secs(3600);

    Ok(())
}

#[tokio::test]
async fn test_login_wrong_password_returns_401() -> Result<(), anyhow::Error> {
    let server = TestLmsServer::spawn().await?;
    server
        .create_user("alice", TEST_PASSWORD, Role::Student)
        .await?;

    let response = login(&reqwest::Client::new(), &server, "alice", "wrong").await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");

    Ok(())
}

/// Unknown usernames and wrong passwords are indistinguishable.
#[tokio::test]
async fn test_login_unknown_user_matches_wrong_password() -> Result<(), anyhow::Error> {
    let server = TestLmsServer::spawn().await?;
    server
        .create_user("alice", TEST_PASSWORD, Role::Student)
        .await?;
    let client = reqwest::Client::new();

    let wrong_password = login(&client, &server, "alice", "wrong").await?;
    let wrong_status = wrong_password.status();
    let wrong_body: Value = wrong_password.json().await?;

    let unknown_user = login(&client, &server, "nobody", "wrong").await?;
    let unknown_status = unknown_user.status();
    let unknown_body: Value = unknown_user.json().await?;

    assert_eq!(wrong_status, unknown_status);
    assert_eq!(wrong_body, unknown_body);

    Ok(())
}

// ============================================================================
// End to end
// ============================================================================

/// A student registers, logs in and is refused course creation; an
/// instructor doing the same gets 201.
#[tokio::test]
async fn test_student_forbidden_instructor_creates_course() -> Result<(), anyhow::Error> {
    let server = TestLmsServer::spawn().await?;
    let client = reqwest::Client::new();

    for (username, role) in [("alice", "mahasiswa"), ("pak_budi", "dosen")] {
        let response = client
            .post(format!("{}/api/lms/register", server.url()))
            .json(&json!({"username": username, "password": "pw-123456", "role": role}))
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let alice: Value = login(&client, &server, "alice", "pw-123456")
        .await?
        .json()
        .await?;
    let budi: Value = login(&client, &server, "pak_budi", "pw-123456")
        .await?
        .json()
        .await?;
    let budi_id = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = 'pak_budi'")
        .fetch_one(server.pool())
        .await?;

    let course = json!({
        "title": "Algoritma",
        "description": "Dasar algoritma",
        "instructor_id": budi_id
    });

    let response = client
        .post(format!("{}/api/lms/courses", server.url()))
        .bearer_auth(alice["access_token"].as_str().unwrap_or_default())
        .json(&course)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "FORBIDDEN");
    assert_eq!(body["error"]["provided_role"], "mahasiswa");

    let response = client
        .post(format!("{}/api/lms/courses", server.url()))
        .bearer_auth(budi["access_token"].as_str().unwrap_or_default())
        .json(&course)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await?;
    assert_eq!(body["title"], "Algoritma");
    assert_eq!(body["instructor_id"], budi_id);

    Ok(())
}
