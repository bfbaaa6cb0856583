//! Course repository.

use super::is_foreign_key_violation;
use crate::errors::LmsError;
use crate::models::Course;
use chrono::Utc;
use sqlx::SqlitePool;

/// Insert a course. An unknown `instructor_id` is reported as `NotFound`.
pub async fn create_course(
    pool: &SqlitePool,
    title: &str,
    description: &str,
    instructor_id: i64,
) -> Result<Course, LmsError> {
    let course = sqlx::query_as::<_, Course>(
        r#"
        INSERT INTO courses (title, description, instructor_id, created_at)
        VALUES (?1, ?2, ?3, ?4)
        RETURNING id, title, description, instructor_id, created_at
        "#,
    )
    .bind(title)
    .bind(description)
    .bind(instructor_id)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            LmsError::NotFound("Instructor not found".to_string())
        } else {
            LmsError::Database(format!("Failed to create course: {}", e))
        }
    })?;

    Ok(course)
}

pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Course>, LmsError> {
    let course = sqlx::query_as::<_, Course>(
        r#"
        SELECT id, title, description, instructor_id, created_at
        FROM courses
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| LmsError::Database(format!("Failed to fetch course: {}", e)))?;

    Ok(course)
}

/// All courses, newest first.
pub async fn list_courses(pool: &SqlitePool) -> Result<Vec<Course>, LmsError> {
    let courses = sqlx::query_as::<_, Course>(
        r#"
        SELECT id, title, description, instructor_id, created_at
        FROM courses
        ORDER BY id DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| LmsError::Database(format!("Failed to list courses: {}", e)))?;

    Ok(courses)
}

/// Delete a course and, through cascading keys, its lessons, assignments
/// and submissions. Returns `false` if no course had that id.
pub async fn delete_course(pool: &SqlitePool, id: i64) -> Result<bool, LmsError> {
    let result = sqlx::query("DELETE FROM courses WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| LmsError::Database(format!("Failed to delete course: {}", e)))?;

    Ok(result.rows_affected() > 0)
}
