//! Courses, lessons and assignments.
//!
//! The course listing is served cache-aside. Every write that changes the
//! set of courses invalidates the listing before it returns, under the
//! cache's exclusive lock so no in-flight listing can store a snapshot
//! taken before the write.

use crate::errors::LmsError;
use crate::models::{
    Assignment, Course, CreateAssignmentRequest, CreateCourseRequest, CreateLessonRequest, Lesson,
};
use crate::repositories::{assignments, courses, lessons};
use crate::services::course_cache::{CacheAside, COURSE_LIST_CACHE_KEY};
use sqlx::SqlitePool;
use std::time::Duration;

fn require_title(title: &str) -> Result<&str, LmsError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(LmsError::Validation("Title cannot be empty".to_string()));
    }
    Ok(title)
}

/// All courses, newest first, from the cache when possible.
pub async fn list_courses(
    pool: &SqlitePool,
    cache: &CacheAside,
    ttl: Duration,
) -> Result<Vec<Course>, LmsError> {
    cache
        .get_or_load(COURSE_LIST_CACHE_KEY, ttl, || courses::list_courses(pool))
        .await
}

pub async fn create_course(
    pool: &SqlitePool,
    cache: &CacheAside,
    request: CreateCourseRequest,
) -> Result<Course, LmsError> {
    let title = require_title(&request.title)?;

    let course = cache
        .invalidate_after(COURSE_LIST_CACHE_KEY, || {
            courses::create_course(pool, title, request.description.trim(), request.instructor_id)
        })
        .await?;

    tracing::info!(target: "lms.courses", course_id = course.id, "Course created");
    Ok(course)
}

pub async fn delete_course(
    pool: &SqlitePool,
    cache: &CacheAside,
    course_id: i64,
) -> Result<(), LmsError> {
    cache
        .invalidate_after(COURSE_LIST_CACHE_KEY, || async {
            if courses::delete_course(pool, course_id).await? {
                Ok(())
            } else {
                Err(LmsError::NotFound("Course not found".to_string()))
            }
        })
        .await?;

    tracing::info!(target: "lms.courses", course_id = course_id, "Course deleted");
    Ok(())
}

pub async fn list_lessons(pool: &SqlitePool) -> Result<Vec<Lesson>, LmsError> {
    lessons::list_lessons(pool).await
}

pub async fn create_lesson(
    pool: &SqlitePool,
    request: CreateLessonRequest,
) -> Result<Lesson, LmsError> {
    let title = require_title(&request.title)?;
    lessons::create_lesson(pool, request.course_id, title, &request.content).await
}

pub async fn list_assignments(pool: &SqlitePool) -> Result<Vec<Assignment>, LmsError> {
    assignments::list_assignments(pool).await
}

pub async fn create_assignment(
    pool: &SqlitePool,
    request: CreateAssignmentRequest,
) -> Result<Assignment, LmsError> {
    let title = require_title(&request.title)?;
    assignments::create_assignment(pool, request.course_id, title, request.deadline).await
}
