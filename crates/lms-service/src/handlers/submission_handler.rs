use crate::errors::LmsError;
use crate::models::{CreateSubmissionRequest, Principal, Submission};
use crate::routes::AppState;
use crate::services::{access_policy, submission_service};
use axum::{extract::State, http::StatusCode, Extension, Json};
use std::sync::Arc;
use tracing::instrument;

/// GET /api/lms/submissions (admin, dosen)
#[instrument(skip_all, name = "lms.handler.list_submissions")]
pub async fn list_submissions(
    State(state): State<Arc<AppState>>,
    principal: Option<Extension<Principal>>,
) -> Result<Json<Vec<Submission>>, LmsError> {
    access_policy::require(principal.as_deref(), access_policy::STAFF)?;

    Ok(Json(submission_service::list_submissions(&state.pool).await?))
}

/// POST /api/lms/submissions (mahasiswa)
#[instrument(skip_all, name = "lms.handler.create_submission")]
pub async fn create_submission(
    State(state): State<Arc<AppState>>,
    principal: Option<Extension<Principal>>,
    Json(payload): Json<CreateSubmissionRequest>,
) -> Result<(StatusCode, Json<Submission>), LmsError> {
    access_policy::require(principal.as_deref(), access_policy::STUDENTS_ONLY)?;

    let submission = submission_service::create_submission(&state.pool, payload).await?;
    Ok((StatusCode::CREATED, Json(submission)))
}
