//! Course, lesson and assignment endpoints.

use crate::errors::LmsError;
use crate::models::{
    Assignment, Course, CreateAssignmentRequest, CreateCourseRequest, CreateLessonRequest, Lesson,
    MessageResponse, Principal,
};
use crate::routes::AppState;
use crate::services::{access_policy, course_service};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// GET /api/lms/courses (any authenticated role)
#[instrument(skip_all, name = "lms.handler.list_courses")]
pub async fn list_courses(
    State(state): State<Arc<AppState>>,
    principal: Option<Extension<Principal>>,
) -> Result<Json<Vec<Course>>, LmsError> {
    access_policy::require(principal.as_deref(), access_policy::ANY_ROLE)?;

    let ttl = Duration::from_secs(state.config.course_cache_ttl_seconds);
    let courses = course_service::list_courses(&state.pool, &state.course_cache, ttl).await?;
    Ok(Json(courses))
}

/// POST /api/lms/courses (admin, dosen)
#[instrument(skip_all, name = "lms.handler.create_course")]
pub async fn create_course(
    State(state): State<Arc<AppState>>,
    principal: Option<Extension<Principal>>,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<Course>), LmsError> {
    access_policy::require(principal.as_deref(), access_policy::STAFF)?;

    let course = course_service::create_course(&state.pool, &state.course_cache, payload).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// DELETE /api/lms/courses/:course_id (admin, dosen)
#[instrument(skip_all, name = "lms.handler.delete_course")]
pub async fn delete_course(
    State(state): State<Arc<AppState>>,
    principal: Option<Extension<Principal>>,
    Path(course_id): Path<i64>,
) -> Result<Json<MessageResponse>, LmsError> {
    access_policy::require(principal.as_deref(), access_policy::STAFF)?;

    course_service::delete_course(&state.pool, &state.course_cache, course_id).await?;
    Ok(Json(MessageResponse {
        message: "Course deleted".to_string(),
    }))
}

/// GET /api/lms/lessons (public)
pub async fn list_lessons(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Lesson>>, LmsError> {
    Ok(Json(course_service::list_lessons(&state.pool).await?))
}

/// POST /api/lms/lessons (admin, dosen)
#[instrument(skip_all, name = "lms.handler.create_lesson")]
pub async fn create_lesson(
    State(state): State<Arc<AppState>>,
    principal: Option<Extension<Principal>>,
    Json(payload): Json<CreateLessonRequest>,
) -> Result<(StatusCode, Json<Lesson>), LmsError> {
    access_policy::require(principal.as_deref(), access_policy::STAFF)?;

    let lesson = course_service::create_lesson(&state.pool, payload).await?;
    Ok((StatusCode::CREATED, Json(lesson)))
}

/// GET /api/lms/assignments (public)
pub async fn list_assignments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Assignment>>, LmsError> {
    Ok(Json(course_service::list_assignments(&state.pool).await?))
}

/// POST /api/lms/assignments (admin, dosen)
#[instrument(skip_all, name = "lms.handler.create_assignment")]
pub async fn create_assignment(
    State(state): State<Arc<AppState>>,
    principal: Option<Extension<Principal>>,
    Json(payload): Json<CreateAssignmentRequest>,
) -> Result<(StatusCode, Json<Assignment>), LmsError> {
    access_policy::require(principal.as_deref(), access_policy::STAFF)?;

    let assignment = course_service::create_assignment(&state.pool, payload).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}
