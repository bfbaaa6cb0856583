//! E2E tests for the role matrix of every `/api/lms` endpoint.

use common::types::Role;
use lms_service::repositories::{assignments, courses};
use lms_test_utils::TestLmsServer;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

struct Fixture {
    server: TestLmsServer,
    admin: String,
    dosen: String,
    student: String,
    student_id: i64,
    course_id: i64,
    assignment_id: i64,
}

async fn fixture() -> Result<Fixture, anyhow::Error> {
    let server = TestLmsServer::spawn().await?;
    let admin = server.token_for("root", Role::Admin).await?;

    let dosen_user = server.create_user("pak_budi", "pw", Role::Instructor).await?;
    let dosen = server.token_for_user(&dosen_user)?;

    let student_user = server.create_user("alice", "pw", Role::Student).await?;
    let student = server.token_for_user(&student_user)?;

    let course = courses::create_course(server.pool(), "Basis Data", "SQL", dosen_user.id).await?;
    let assignment = assignments::create_assignment(
        server.pool(),
        course.id,
        "Tugas 1",
        chrono::Utc::now() + chrono::Duration::days(7),
    )
    .await?;

    Ok(Fixture {
        server,
        admin,
        dosen,
        student,
        student_id: student_user.id,
        course_id: course.id,
        assignment_id: assignment.id,
    })
}

async fn call(
    server: &TestLmsServer,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<StatusCode, anyhow::Error> {
    let mut request = reqwest::Client::new().request(method, format!("{}{}", server.url(), path));
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }
    if let Some(body) = body {
        request = request.json(&body);
    }
    Ok(request.send().await?.status())
}

#[tokio::test]
async fn test_list_users_is_admin_only() -> Result<(), anyhow::Error> {
    let f = fixture().await?;

    let status = call(&f.server, Method::GET, "/api/lms/users", Some(f.admin.as_str()), None).await?;
    assert_eq!(status, StatusCode::OK);

    for token in [&f.dosen, &f.student] {
        let status = call(&f.server, Method::GET, "/api/lms/users", Some(token.as_str()), None).await?;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    let status = call(&f.server, Method::GET, "/api/lms/users", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_list_courses_allows_every_role() -> Result<(), anyhow::Error> {
    let f = fixture().await?;

    for token in [&f.admin, &f.dosen, &f.student] {
        let status = call(&f.server, Method::GET, "/api/lms/courses", Some(token.as_str()), None).await?;
        assert_eq!(status, StatusCode::OK);
    }
    Ok(())
}

#[tokio::test]
async fn test_staff_only_writes_reject_students() -> Result<(), anyhow::Error> {
    let f = fixture().await?;
    let deadline = (chrono::Utc::now() + chrono::Duration::days(3)).to_rfc3339();

    let writes = [
        (
            Method::POST,
            "/api/lms/courses".to_string(),
            Some(json!({"title": "X", "description": "Y", "instructor_id": 1})),
        ),
        (
            Method::DELETE,
            format!("/api/lms/courses/{}", f.course_id),
            None,
        ),
        (
            Method::POST,
            "/api/lms/lessons".to_string(),
            Some(json!({"title": "L", "content": "C", "course_id": f.course_id})),
        ),
        (
            Method::POST,
            "/api/lms/assignments".to_string(),
            Some(json!({"title": "A", "deadline": deadline, "course_id": f.course_id})),
        ),
        (Method::GET, "/api/lms/submissions".to_string(), None),
    ];

    for (method, path, body) in writes {
        let status = call(
            &f.server,
            method.clone(),
            &path,
            Some(f.student.as_str()),
            body.clone(),
        )
        .await?;
        assert_eq!(
            status,
            StatusCode::FORBIDDEN,
            "{} {} should be forbidden for students",
            method,
            path
        );

        let status = call(&f.server, method.clone(), &path, None, body).await?;
        assert_eq!(
            status,
            StatusCode::UNAUTHORIZED,
            "{} {} should require a token",
            method,
            path
        );
    }
    Ok(())
}

#[tokio::test]
async fn test_staff_can_create_lessons_and_assignments() -> Result<(), anyhow::Error> {
    let f = fixture().await?;
    let deadline = (chrono::Utc::now() + chrono::Duration::days(3)).to_rfc3339();

    for token in [&f.admin, &f.dosen] {
        let status = call(
            &f.server,
            Method::POST,
            "/api/lms/lessons",
            Some(token.as_str()),
            Some(json!({"title": "Pengantar", "content": "...", "course_id": f.course_id})),
        )
        .await?;
        assert_eq!(status, StatusCode::CREATED);

        let status = call(
            &f.server,
            Method::POST,
            "/api/lms/assignments",
            Some(token.as_str()),
            Some(json!({"title": "Kuis", "deadline": deadline, "course_id": f.course_id})),
        )
        .await?;
        assert_eq!(status, StatusCode::CREATED);

        let status = call(
            &f.server,
            Method::GET,
            "/api/lms/submissions",
            Some(token.as_str()),
            None,
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
    }
    Ok(())
}

#[tokio::test]
async fn test_create_submission_is_students_only() -> Result<(), anyhow::Error> {
    let f = fixture().await?;
    let body = json!({
        "answer": "42",
        "student_id": f.student_id,
        "assignment_id": f.assignment_id
    });

    for token in [&f.admin, &f.dosen] {
        let status = call(
            &f.server,
            Method::POST,
            "/api/lms/submissions",
            Some(token.as_str()),
            Some(body.clone()),
        )
        .await?;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    let status = call(
        &f.server,
        Method::POST,
        "/api/lms/submissions",
        Some(f.student.as_str()),
        Some(body),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    Ok(())
}

#[tokio::test]
async fn test_lesson_and_assignment_listings_are_public() -> Result<(), anyhow::Error> {
    let f = fixture().await?;

    for path in ["/api/lms/lessons", "/api/lms/assignments"] {
        let status = call(&f.server, Method::GET, path, None, None).await?;
        assert_eq!(status, StatusCode::OK, "{} should be public", path);
    }
    Ok(())
}

#[tokio::test]
async fn test_forbidden_body_names_required_roles() -> Result<(), anyhow::Error> {
    let f = fixture().await?;

    let response = reqwest::Client::new()
        .get(format!("{}/api/lms/users", f.server.url()))
        .bearer_auth(&f.dosen)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["required_roles"], json!(["admin"]));
    assert_eq!(body["error"]["provided_role"], "dosen");
    Ok(())
}
