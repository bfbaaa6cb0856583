//! Test server harness for E2E testing
//!
//! Provides `TestLmsServer`, a real LMS server on a random local port backed
//! by a private in-memory database.

use crate::test_ids::{TEST_PASSWORD, TEST_TOKEN_SECRET};
use common::secret::SecretString;
use common::types::Role;
use lms_service::config::{
    Config, DEFAULT_COURSE_CACHE_TTL_SECONDS, DEFAULT_RATE_LIMIT_MAX_ATTEMPTS,
    DEFAULT_RATE_LIMIT_WINDOW_SECONDS, DEFAULT_TOKEN_TTL_MINUTES, MIN_BCRYPT_COST,
};
use lms_service::crypto;
use lms_service::models::{Principal, User};
use lms_service::observability::metrics::init_metrics_recorder;
use lms_service::repositories::{self, users};
use lms_service::routes::{self, AppState};
use lms_service::store::{KvStore, MemoryStore};
use sqlx::SqlitePool;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Configuration used by test servers unless a test overrides it.
///
/// bcrypt runs at the lowest accepted cost to keep logins fast.
pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        bind_address: "127.0.0.1:0".to_string(),
        token_secret: SecretString::from(TEST_TOKEN_SECRET.to_string()),
        token_ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
        rate_limit_max_attempts: DEFAULT_RATE_LIMIT_MAX_ATTEMPTS,
        rate_limit_window_seconds: DEFAULT_RATE_LIMIT_WINDOW_SECONDS,
        course_cache_ttl_seconds: DEFAULT_COURSE_CACHE_TTL_SECONDS,
        bcrypt_cost: MIN_BCRYPT_COST,
        redis_url: None,
        json_logs: false,
    }
}

/// Test harness for spawning the LMS server in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_login_e2e() -> Result<()> {
///     let server = TestLmsServer::spawn().await?;
///     server.create_user("alice", TEST_PASSWORD, Role::Student).await?;
///
///     let response = reqwest::Client::new()
///         .post(format!("{}/api/lms/login", server.url()))
///         .json(&json!({"username": "alice", "password": TEST_PASSWORD}))
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestLmsServer {
    addr: SocketAddr,
    pool: SqlitePool,
    config: Config,
    state: Arc<AppState>,
    handle: JoinHandle<()>,
}

impl TestLmsServer {
    /// Spawn a server with `test_config()` and an in-process store.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with(test_config()).await
    }

    /// Spawn a server with a custom configuration.
    pub async fn spawn_with(config: Config) -> Result<Self, anyhow::Error> {
        Self::spawn_with_store(config, Arc::new(MemoryStore::new())).await
    }

    /// Spawn a server on top of the given store, e.g. one that always fails.
    pub async fn spawn_with_store(
        config: Config,
        store: Arc<dyn KvStore>,
    ) -> Result<Self, anyhow::Error> {
        // Every server gets its own in-memory database.
        let pool = repositories::connect("sqlite::memory:")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to prepare test database: {}", e))?;

        let state = Arc::new(AppState::new(pool.clone(), config.clone(), store));

        // The global recorder can only be installed once per test process;
        // later servers get a standalone recorder.
        let metrics_handle = match init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => {
                use metrics_exporter_prometheus::PrometheusBuilder;
                PrometheusBuilder::new().build_recorder().handle()
            }
        };

        let app = routes::build_routes(Arc::clone(&state), metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, make_service).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            pool,
            config,
            state,
            handle,
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared application state, for reaching the store or services directly.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Insert a user straight into the database.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<User, anyhow::Error> {
        let hash = crypto::hash_password(password, self.config.bcrypt_cost)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
        let email = format!("{}@example.test", username);

        users::create_user(&self.pool, username, &email, &hash, role)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create user: {}", e))
    }

    /// Create a user with `TEST_PASSWORD` and issue them a token without
    /// going through `/login`, so the rate limiter is left untouched.
    pub async fn token_for(&self, username: &str, role: Role) -> Result<String, anyhow::Error> {
        let user = self.create_user(username, TEST_PASSWORD, role).await?;
        self.token_for_user(&user)
    }

    /// Issue a token for an existing user.
    pub fn token_for_user(&self, user: &User) -> Result<String, anyhow::Error> {
        let issued = self
            .state
            .tokens
            .issue(&Principal::from(user))
            .map_err(|e| anyhow::anyhow!("Failed to issue token: {}", e))?;
        Ok(issued.access_token)
    }
}

impl Drop for TestLmsServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
