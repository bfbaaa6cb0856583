//! LMS server entry point.

use lms_service::config::Config;
use lms_service::observability::metrics::init_metrics_recorder;
use lms_service::repositories;
use lms_service::routes::{self, AppState};
use lms_service::store::{KvStore, MemoryStore, RedisStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configuration first: it decides the log format.
    let config = Config::from_env();
    let json_logs = config.as_ref().map(|c| c.json_logs).unwrap_or(false);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lms_service=debug,tower_http=debug".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    info!("Starting LMS service");

    let config = config.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        token_ttl_minutes = config.token_ttl_minutes,
        rate_limit_max_attempts = config.rate_limit_max_attempts,
        rate_limit_window_seconds = config.rate_limit_window_seconds,
        course_cache_ttl_seconds = config.course_cache_ttl_seconds,
        "Configuration loaded successfully"
    );

    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics recorder: {}", e);
        e
    })?;

    info!("Connecting to database...");
    let pool = repositories::connect(&config.database_url)
        .await
        .map_err(|e| {
            error!("Failed to prepare database: {}", e);
            e
        })?;
    info!("Database ready");

    let store: Arc<dyn KvStore> = match &config.redis_url {
        Some(url) => {
            let redis = RedisStore::connect(url).await.map_err(|e| {
                error!("Failed to connect to Redis: {}", e);
                e
            })?;
            info!("Using Redis for rate limiting and caching");
            Arc::new(redis)
        }
        None => {
            warn!(
                "REDIS_URL not set; rate limits and cache are per process and reset on restart"
            );
            Arc::new(MemoryStore::new())
        }
    };

    let bind_address = config.bind_address.clone();
    let state = Arc::new(AppState::new(pool, config, store));
    let app = routes::build_routes(state, metrics_handle);

    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("LMS service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("LMS service shutdown complete");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, shutting down"),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, shutting down");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
