use super::is_foreign_key_violation;
use crate::errors::LmsError;
use crate::models::Assignment;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub async fn create_assignment(
    pool: &SqlitePool,
    course_id: i64,
    title: &str,
    deadline: DateTime<Utc>,
) -> Result<Assignment, LmsError> {
    let assignment = sqlx::query_as::<_, Assignment>(
        r#"
        INSERT INTO assignments (course_id, title, deadline)
        VALUES (?1, ?2, ?3)
        RETURNING id, title, deadline, course_id
        "#,
    )
    .bind(course_id)
    .bind(title)
    .bind(deadline)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            LmsError::NotFound("Course not found".to_string())
        } else {
            LmsError::Database(format!("Failed to create assignment: {}", e))
        }
    })?;

    Ok(assignment)
}

pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Assignment>, LmsError> {
    let assignment = sqlx::query_as::<_, Assignment>(
        r#"
        SELECT id, title, deadline, course_id
        FROM assignments
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| LmsError::Database(format!("Failed to fetch assignment: {}", e)))?;

    Ok(assignment)
}

pub async fn list_assignments(pool: &SqlitePool) -> Result<Vec<Assignment>, LmsError> {
    let assignments = sqlx::query_as::<_, Assignment>(
        r#"
        SELECT id, title, deadline, course_id
        FROM assignments
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| LmsError::Database(format!("Failed to list assignments: {}", e)))?;

    Ok(assignments)
}
