//! Database access layer.
//!
//! Each submodule is a set of free async functions over `&SqlitePool` that
//! return `LmsError::Database` on failure.

pub mod assignments;
pub mod courses;
pub mod lessons;
pub mod submissions;
pub mod users;

use crate::errors::LmsError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Open a connection pool for `database_url` and run pending migrations.
///
/// An in-memory database only exists per connection, so it is served from a
/// single connection that is never recycled.
pub async fn connect(database_url: &str) -> Result<SqlitePool, LmsError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| LmsError::Database(format!("Invalid database URL: {}", e)))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool_options = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(|e| LmsError::Database(format!("Failed to connect to database: {}", e)))?;

    crate::MIGRATOR
        .run(&pool)
        .await
        .map_err(|e| LmsError::Database(format!("Failed to run migrations: {}", e)))?;

    Ok(pool)
}

/// True if the error is a UNIQUE constraint violation.
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// True if the error is a FOREIGN KEY constraint violation.
pub(crate) fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}
