//! Bearer token authentication.
//!
//! Runs on every `/api/lms` route. A request without an `Authorization`
//! header continues with no principal, and the handler's access policy
//! decides whether that is acceptable. A header that is present but
//! unusable fails the request with 401 before any handler runs.

use crate::errors::LmsError;
use crate::models::Principal;
use crate::routes::AppState;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::instrument;

/// Extract the Bearer token, if an Authorization header is present.
fn extract_bearer_token(req: &Request) -> Result<Option<&str>, LmsError> {
    let Some(header) = req.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = header.to_str().map_err(|_| {
        tracing::debug!(target: "lms.middleware.auth", "Non-ASCII Authorization header");
        LmsError::InvalidToken("Invalid Authorization header format".to_string())
    })?;

    // The auth scheme is case-insensitive (RFC 9110 section 11.1).
    let token = value
        .split_once(' ')
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            tracing::debug!(target: "lms.middleware.auth", "Invalid Authorization header format");
            LmsError::InvalidToken("Invalid Authorization header format".to_string())
        })?;

    Ok(Some(token))
}

/// Resolve the request's principal and store it in the request extensions.
#[instrument(skip_all, name = "lms.middleware.auth")]
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, LmsError> {
    if let Some(token) = extract_bearer_token(&req)? {
        let principal: Principal = state.tokens.authenticate(&state.pool, token).await?;
        req.extensions_mut().insert(principal);
    }

    Ok(next.run(req).await)
}
