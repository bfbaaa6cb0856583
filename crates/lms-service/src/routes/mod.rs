//! HTTP routes and application state.

use crate::config::Config;
use crate::handlers::{self, auth_handler, course_handler, submission_handler, user_handler};
use crate::middleware::{authenticate, http_metrics_middleware};
use crate::services::course_cache::CacheAside;
use crate::services::rate_limiter::LoginRateLimiter;
use crate::services::token_service::TokenService;
use crate::store::KvStore;
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub tokens: TokenService,
    pub rate_limiter: LoginRateLimiter,
    pub course_cache: CacheAside,
    /// Shared store behind the rate limiter and the cache, probed by `/ready`.
    pub store: Arc<dyn KvStore>,
}

impl AppState {
    /// Wire the services onto one shared store.
    pub fn new(pool: SqlitePool, config: Config, store: Arc<dyn KvStore>) -> Self {
        Self {
            tokens: TokenService::new(&config),
            rate_limiter: LoginRateLimiter::from_config(Arc::clone(&store), &config),
            course_cache: CacheAside::new(Arc::clone(&store), "courses"),
            pool,
            config,
            store,
        }
    }
}

/// Build the application routes.
///
/// - `/health`, `/ready`, `/metrics` - operational, unauthenticated
/// - `/api/lms/*` - bearer authentication resolved by middleware, roles
///   enforced per handler
/// - TraceLayer, HTTP metrics and a 30 second request timeout
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let operational_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .with_state(state.clone());

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    let api_routes = Router::new()
        .route("/api/lms/register", post(auth_handler::register))
        .route("/api/lms/login", post(auth_handler::login))
        .route("/api/lms/users", get(user_handler::list_users))
        .route(
            "/api/lms/courses",
            get(course_handler::list_courses).post(course_handler::create_course),
        )
        .route(
            "/api/lms/courses/:course_id",
            delete(course_handler::delete_course),
        )
        .route(
            "/api/lms/lessons",
            get(course_handler::list_lessons).post(course_handler::create_lesson),
        )
        .route(
            "/api/lms/assignments",
            get(course_handler::list_assignments).post(course_handler::create_assignment),
        )
        .route(
            "/api/lms/submissions",
            get(submission_handler::list_submissions).post(submission_handler::create_submission),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .with_state(state);

    // Layer order (outermost last): timeout, trace, metrics.
    operational_routes
        .merge(metrics_routes)
        .merge(api_routes)
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(http_metrics_middleware))
}
