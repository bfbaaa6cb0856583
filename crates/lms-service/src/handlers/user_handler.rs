use crate::errors::LmsError;
use crate::models::{Principal, UserResponse};
use crate::routes::AppState;
use crate::services::{access_policy, user_service};
use axum::{extract::State, Extension, Json};
use std::sync::Arc;
use tracing::instrument;

/// List users
///
/// GET /api/lms/users (admin only)
#[instrument(skip_all, name = "lms.handler.list_users")]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    principal: Option<Extension<Principal>>,
) -> Result<Json<Vec<UserResponse>>, LmsError> {
    access_policy::require(principal.as_deref(), access_policy::ADMIN_ONLY)?;

    let users = user_service::list_users(&state.pool).await?;
    Ok(Json(users))
}
