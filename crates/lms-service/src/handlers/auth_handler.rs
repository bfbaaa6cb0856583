use crate::errors::LmsError;
use crate::models::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};
use crate::routes::AppState;
use crate::services::user_service;
use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::instrument;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Handle user registration
///
/// POST /api/lms/register
#[instrument(skip_all, name = "lms.handler.register")]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), LmsError> {
    let user = user_service::register_user(&state.pool, state.config.bcrypt_cost, payload).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Handle login
///
/// POST /api/lms/login
///
/// Rate limited per client address; see [`client_key`].
#[instrument(skip_all, name = "lms.handler.login")]
pub async fn login(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, LmsError> {
    let client = client_key(&headers, connect_info.map(|ConnectInfo(addr)| addr));

    let response = user_service::login(
        &state.pool,
        &state.tokens,
        &state.rate_limiter,
        &client,
        payload,
    )
    .await?;

    Ok(Json(response))
}

/// Identity used to bucket login attempts.
///
/// The first `X-Forwarded-For` entry when present, else the peer IP, else
/// `"unknown"`.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match (forwarded, peer) {
        (Some(client), _) => client.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => "unknown".to_string(),
    }
}
