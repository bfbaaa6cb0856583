use super::is_foreign_key_violation;
use crate::errors::LmsError;
use crate::models::Lesson;
use sqlx::SqlitePool;

pub async fn create_lesson(
    pool: &SqlitePool,
    course_id: i64,
    title: &str,
    content: &str,
) -> Result<Lesson, LmsError> {
    let lesson = sqlx::query_as::<_, Lesson>(
        r#"
        INSERT INTO lessons (course_id, title, content)
        VALUES (?1, ?2, ?3)
        RETURNING id, title, content, course_id
        "#,
    )
    .bind(course_id)
    .bind(title)
    .bind(content)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            LmsError::NotFound("Course not found".to_string())
        } else {
            LmsError::Database(format!("Failed to create lesson: {}", e))
        }
    })?;

    Ok(lesson)
}

pub async fn list_lessons(pool: &SqlitePool) -> Result<Vec<Lesson>, LmsError> {
    let lessons = sqlx::query_as::<_, Lesson>(
        r#"
        SELECT id, title, content, course_id
        FROM lessons
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| LmsError::Database(format!("Failed to list lessons: {}", e)))?;

    Ok(lessons)
}
