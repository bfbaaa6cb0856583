use crate::errors::LmsError;
use crate::models::{CreateSubmissionRequest, Submission};
use crate::repositories::{assignments, submissions, users};
use sqlx::SqlitePool;

/// Record a student's answer to an assignment. The grade starts empty.
///
/// # Errors
///
/// `NotFound` if the assignment or the student does not exist.
pub async fn create_submission(
    pool: &SqlitePool,
    request: CreateSubmissionRequest,
) -> Result<Submission, LmsError> {
    if assignments::get_by_id(pool, request.assignment_id)
        .await?
        .is_none()
    {
        return Err(LmsError::NotFound("Assignment not found".to_string()));
    }
    if users::get_by_id(pool, request.student_id).await?.is_none() {
        return Err(LmsError::NotFound("Student not found".to_string()));
    }

    let submission = submissions::create_submission(
        pool,
        request.assignment_id,
        request.student_id,
        &request.answer,
    )
    .await?;

    tracing::info!(
        target: "lms.submissions",
        submission_id = submission.id,
        assignment_id = submission.assignment_id,
        "Submission received"
    );
    Ok(submission)
}

pub async fn list_submissions(pool: &SqlitePool) -> Result<Vec<Submission>, LmsError> {
    submissions::list_submissions(pool).await
}
