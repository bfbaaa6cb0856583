//! User repository.

use super::is_unique_violation;
use crate::errors::LmsError;
use crate::models::User;
use chrono::Utc;
use common::types::Role;
use sqlx::SqlitePool;

/// Insert a user and return the stored row.
///
/// A taken username is reported as `LmsError::Validation`.
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
    role: Role,
) -> Result<User, LmsError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, email, password_hash, role, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING id, username, email, password_hash, role, created_at
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(role.as_str())
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            LmsError::Validation("Username already exists".to_string())
        } else {
            LmsError::Database(format!("Failed to create user: {}", e))
        }
    })?;

    Ok(user)
}

pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, LmsError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, role, created_at
        FROM users
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| LmsError::Database(format!("Failed to fetch user by id: {}", e)))?;

    Ok(user)
}

pub async fn get_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>, LmsError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, role, created_at
        FROM users
        WHERE username = ?1
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await
    .map_err(|e| LmsError::Database(format!("Failed to fetch user by username: {}", e)))?;

    Ok(user)
}

pub async fn username_exists(pool: &SqlitePool, username: &str) -> Result<bool, LmsError> {
    let (exists,): (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)")
            .bind(username)
            .fetch_one(pool)
            .await
            .map_err(|e| LmsError::Database(format!("Failed to check username: {}", e)))?;

    Ok(exists)
}

/// All users, oldest first.
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>, LmsError> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, role, created_at
        FROM users
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| LmsError::Database(format!("Failed to list users: {}", e)))?;

    Ok(users)
}
