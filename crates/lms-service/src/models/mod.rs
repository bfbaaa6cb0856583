use chrono::{DateTime, Utc};
use common::secret::SecretString;
use common::types::Role;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Authenticated actor of a request.
///
/// Built from a verified access token (and the stored user row) by the
/// auth middleware and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Principal {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

/// User model (maps to users table)
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Course model (maps to courses table)
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub instructor_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Lesson model (maps to lessons table)
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub course_id: i64,
}

/// Assignment model (maps to assignments table)
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub title: String,
    pub deadline: DateTime<Utc>,
    pub course_id: i64,
}

/// Submission model (maps to submissions table)
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub answer: String,
    pub grade: Option<i64>,
    pub student_id: i64,
    pub assignment_id: i64,
}

// ============================================================================
// Requests
// ============================================================================

/// Registration request. `role` stays a string here so that an unknown
/// value is reported as a validation error instead of a JSON rejection.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: SecretString,
    #[serde(default)]
    pub email: Option<String>,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: SecretString,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: String,
    pub instructor_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateLessonRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub course_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssignmentRequest {
    pub title: String,
    pub deadline: DateTime<Utc>,
    pub course_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubmissionRequest {
    pub answer: String,
    pub student_id: i64,
    pub assignment_id: i64,
}

// ============================================================================
// Responses
// ============================================================================

/// Public view of a user (no password hash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
        }
    }
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub role: Role,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Readiness probe body.
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    /// "ready" or "not_ready"
    pub status: &'static str,
    pub database: &'static str,
    pub store: &'static str,
    /// Generic message only; causes are logged server-side.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}
