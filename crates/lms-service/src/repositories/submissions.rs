use crate::errors::LmsError;
use crate::models::Submission;
use sqlx::SqlitePool;

/// Insert a submission with no grade.
///
/// Callers check that the assignment and student exist first so the error
/// can say which one is missing.
pub async fn create_submission(
    pool: &SqlitePool,
    assignment_id: i64,
    student_id: i64,
    answer: &str,
) -> Result<Submission, LmsError> {
    let submission = sqlx::query_as::<_, Submission>(
        r#"
        INSERT INTO submissions (assignment_id, student_id, answer)
        VALUES (?1, ?2, ?3)
        RETURNING id, answer, grade, student_id, assignment_id
        "#,
    )
    .bind(assignment_id)
    .bind(student_id)
    .bind(answer)
    .fetch_one(pool)
    .await
    .map_err(|e| LmsError::Database(format!("Failed to create submission: {}", e)))?;

    Ok(submission)
}

pub async fn list_submissions(pool: &SqlitePool) -> Result<Vec<Submission>, LmsError> {
    let submissions = sqlx::query_as::<_, Submission>(
        r#"
        SELECT id, answer, grade, student_id, assignment_id
        FROM submissions
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| LmsError::Database(format!("Failed to list submissions: {}", e)))?;

    Ok(submissions)
}
