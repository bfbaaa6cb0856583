use common::secret::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Default access token lifetime.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;

/// Default number of failed logins tolerated per client within one window.
pub const DEFAULT_RATE_LIMIT_MAX_ATTEMPTS: u32 = 5;

/// Default length of a login rate-limit window.
pub const DEFAULT_RATE_LIMIT_WINDOW_SECONDS: u64 = 60;

/// Default lifetime of the cached course listing.
pub const DEFAULT_COURSE_CACHE_TTL_SECONDS: u64 = 60;

/// Default bcrypt cost factor (2^12 iterations, ~200ms).
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Lowest accepted bcrypt cost.
pub const MIN_BCRYPT_COST: u32 = 10;

/// Highest accepted bcrypt cost; higher values make login latency unacceptable.
pub const MAX_BCRYPT_COST: u32 = 14;

/// HS256 secrets shorter than the hash output weaken the signature.
pub const MIN_TOKEN_SECRET_BYTES: usize = 32;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub token_secret: SecretString,
    pub token_ttl_minutes: i64,
    pub rate_limit_max_attempts: u32,
    pub rate_limit_window_seconds: u64,
    pub course_cache_ttl_seconds: u64,
    pub bcrypt_cost: u32,
    /// When unset the service falls back to the in-process store.
    pub redis_url: Option<String>,
    pub json_logs: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid token secret: {0}")]
    InvalidTokenSecret(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
            .clone();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| "0.0.0.0:8000".to_string());

        let token_secret = vars
            .get("LMS_TOKEN_SECRET")
            .ok_or_else(|| ConfigError::MissingEnvVar("LMS_TOKEN_SECRET".to_string()))?;

        if token_secret.len() < MIN_TOKEN_SECRET_BYTES {
            return Err(ConfigError::InvalidTokenSecret(format!(
                "Expected at least {} bytes, got {}",
                MIN_TOKEN_SECRET_BYTES,
                token_secret.len()
            )));
        }

        let token_ttl_minutes: i64 =
            parse_positive(vars, "LMS_TOKEN_TTL_MINUTES", DEFAULT_TOKEN_TTL_MINUTES)?;
        let rate_limit_max_attempts: u32 = parse_positive(
            vars,
            "LMS_RATE_LIMIT_MAX_ATTEMPTS",
            DEFAULT_RATE_LIMIT_MAX_ATTEMPTS,
        )?;
        let rate_limit_window_seconds: u64 = parse_positive(
            vars,
            "LMS_RATE_LIMIT_WINDOW_SECONDS",
            DEFAULT_RATE_LIMIT_WINDOW_SECONDS,
        )?;
        let course_cache_ttl_seconds: u64 = parse_positive(
            vars,
            "LMS_COURSE_CACHE_TTL_SECONDS",
            DEFAULT_COURSE_CACHE_TTL_SECONDS,
        )?;

        let bcrypt_cost: u32 = parse_positive(vars, "LMS_BCRYPT_COST", DEFAULT_BCRYPT_COST)?;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                name: "LMS_BCRYPT_COST".to_string(),
                reason: format!(
                    "must be between {} and {}, got {}",
                    MIN_BCRYPT_COST, MAX_BCRYPT_COST, bcrypt_cost
                ),
            });
        }

        let redis_url = vars.get("REDIS_URL").filter(|v| !v.is_empty()).cloned();

        let json_logs = vars
            .get("LMS_LOG_JSON")
            .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "yes"))
            .unwrap_or(false);

        Ok(Config {
            database_url,
            bind_address,
            token_secret: SecretString::from(token_secret.clone()),
            token_ttl_minutes,
            rate_limit_max_attempts,
            rate_limit_window_seconds,
            course_cache_ttl_seconds,
            bcrypt_cost,
            redis_url,
            json_logs,
        })
    }

    /// Raw bytes of the token signing secret.
    pub fn token_secret_bytes(&self) -> &[u8] {
        self.token_secret.expose_secret().as_bytes()
    }
}

/// Parse an optional numeric variable that must be strictly positive.
fn parse_positive<T>(
    vars: &HashMap<String, String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
{
    let Some(raw) = vars.get(name) else {
        return Ok(default);
    };

    let value = raw
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

    if value <= T::default() {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(value)
}
