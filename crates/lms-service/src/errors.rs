use axum::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::types::Role;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LmsError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Forbidden: requires one of {required:?}, provided {provided}")]
    Forbidden { required: Vec<Role>, provided: Role },

    #[error("Too many login attempts")]
    TooManyAttempts { retry_after_seconds: u64 },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    required_roles: Option<Vec<Role>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    provided_role: Option<Role>,
}

impl LmsError {
    /// HTTP status for this error kind.
    pub fn status_code(&self) -> StatusCode {
        match self {
            LmsError::Database(_) | LmsError::Crypto(_) | LmsError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            LmsError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            LmsError::InvalidCredentials
            | LmsError::Unauthenticated
            | LmsError::InvalidToken(_)
            | LmsError::ExpiredToken => StatusCode::UNAUTHORIZED,
            LmsError::Forbidden { .. } => StatusCode::FORBIDDEN,
            LmsError::TooManyAttempts { .. } => StatusCode::TOO_MANY_REQUESTS,
            LmsError::NotFound(_) => StatusCode::NOT_FOUND,
            LmsError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for LmsError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (code, message, required_roles, provided_role) = match &self {
            LmsError::Database(_) => (
                "DATABASE_ERROR",
                "An internal database error occurred".to_string(),
                None,
                None,
            ),
            LmsError::StoreUnavailable(_) => (
                "STORE_UNAVAILABLE",
                "A backing service is unavailable. Please try again later.".to_string(),
                None,
                None,
            ),
            LmsError::Crypto(_) => (
                "CRYPTO_ERROR",
                "An internal cryptographic error occurred".to_string(),
                None,
                None,
            ),
            LmsError::InvalidCredentials => (
                "INVALID_CREDENTIALS",
                "Invalid username or password".to_string(),
                None,
                None,
            ),
            LmsError::Unauthenticated => (
                "UNAUTHENTICATED",
                "Authentication required".to_string(),
                None,
                None,
            ),
            LmsError::InvalidToken(reason) => ("INVALID_TOKEN", reason.clone(), None, None),
            LmsError::ExpiredToken => (
                "TOKEN_EXPIRED",
                "The access token has expired".to_string(),
                None,
                None,
            ),
            LmsError::Forbidden { required, provided } => (
                "FORBIDDEN",
                "Forbidden: insufficient role".to_string(),
                Some(required.clone()),
                Some(*provided),
            ),
            LmsError::TooManyAttempts { .. } => (
                "TOO_MANY_ATTEMPTS",
                "Too many login attempts. Try again later.".to_string(),
                None,
                None,
            ),
            LmsError::NotFound(what) => ("NOT_FOUND", what.clone(), None, None),
            LmsError::Validation(reason) => ("VALIDATION_ERROR", reason.clone(), None, None),
            LmsError::Internal => (
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
                None,
                None,
            ),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                required_roles,
                provided_role,
            },
        };

        let mut response = (status, Json(error_response)).into_response();

        if let LmsError::TooManyAttempts {
            retry_after_seconds,
        } = self
        {
            if let Ok(value) = HeaderValue::from_str(&retry_after_seconds.to_string()) {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
        }

        response
    }
}
