//! Registration and login.

use crate::crypto;
use crate::errors::LmsError;
use crate::models::{LoginRequest, LoginResponse, Principal, RegisterRequest, User, UserResponse};
use crate::observability::hash_for_correlation;
use crate::observability::metrics::record_login_attempt;
use crate::repositories::users;
use crate::services::rate_limiter::LoginRateLimiter;
use crate::services::token_service::TokenService;
use common::secret::ExposeSecret;
use common::types::Role;
use sqlx::SqlitePool;

const MAX_USERNAME_LENGTH: usize = 150;

/// Register a user with one of the closed set of roles.
///
/// # Errors
///
/// `Validation` for an empty username or password, an unknown role, or a
/// username that is already taken.
pub async fn register_user(
    pool: &SqlitePool,
    bcrypt_cost: u32,
    request: RegisterRequest,
) -> Result<User, LmsError> {
    let username = request.username.trim();
    if username.is_empty() {
        return Err(LmsError::Validation("Username cannot be empty".to_string()));
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(LmsError::Validation(format!(
            "Username must be at most {} characters",
            MAX_USERNAME_LENGTH
        )));
    }
    if request.password.expose_secret().is_empty() {
        return Err(LmsError::Validation("Password cannot be empty".to_string()));
    }

    let role: Role = request
        .role
        .parse()
        .map_err(|_| LmsError::Validation("Invalid role".to_string()))?;

    if users::username_exists(pool, username).await? {
        return Err(LmsError::Validation("Username already exists".to_string()));
    }

    let password_hash = crypto::hash_password(request.password.expose_secret(), bcrypt_cost)?;
    let email = request.email.as_deref().map(str::trim).unwrap_or_default();

    // A concurrent registration can still win the race; the unique index
    // reports it as the same validation error.
    let user = users::create_user(pool, username, email, &password_hash, role).await?;

    tracing::info!(
        target: "lms.users",
        user = %hash_for_correlation(&user.username),
        role = %user.role,
        "User registered"
    );

    Ok(user)
}

/// Authenticate a user and issue an access token.
///
/// Order matters: the attempt is reserved with the rate limiter before any
/// credential work, so a blocked client learns nothing about the password
/// and a concurrent burst cannot get more than the limit through. Password
/// verification always runs bcrypt, against a dummy hash for unknown
/// usernames.
pub async fn login(
    pool: &SqlitePool,
    tokens: &TokenService,
    limiter: &LoginRateLimiter,
    client: &str,
    request: LoginRequest,
) -> Result<LoginResponse, LmsError> {
    let attempts = match limiter.reserve(client).await {
        Ok(attempts) => attempts,
        Err(e) => {
            if matches!(e, LmsError::TooManyAttempts { .. }) {
                record_login_attempt("rate_limited");
            }
            return Err(e);
        }
    };

    let user = users::get_by_username(pool, request.username.trim()).await?;

    let hash_to_verify = user
        .as_ref()
        .map_or(crypto::DUMMY_PASSWORD_HASH, |u| u.password_hash.as_str());
    let password_ok = crypto::verify_password(request.password.expose_secret(), hash_to_verify)?;

    let user = match user {
        Some(user) if password_ok => user,
        _ => {
            record_login_attempt("invalid_credentials");
            tracing::info!(
                target: "lms.auth",
                client = %hash_for_correlation(client),
                attempts = attempts,
                "Login failed"
            );
            return Err(LmsError::InvalidCredentials);
        }
    };

    limiter.record_success(client).await?;

    let issued = tokens.issue(&Principal::from(&user))?;
    record_login_attempt("success");
    tracing::info!(
        target: "lms.auth",
        user = %hash_for_correlation(&user.username),
        role = %user.role,
        "Login succeeded"
    );

    Ok(LoginResponse {
        expires_in: issued.expires_in(),
        access_token: issued.access_token,
        token_type: "bearer".to_string(),
        role: user.role,
    })
}

/// All users without their password hashes.
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<UserResponse>, LmsError> {
    let users = users::list_users(pool).await?;
    Ok(users.into_iter().map(UserResponse::from).collect())
}
