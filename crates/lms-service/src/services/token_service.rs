//! Access token issuance and verification.

use crate::config::Config;
use crate::crypto::{self, Claims, JWT_CLOCK_SKEW_SECONDS};
use crate::errors::LmsError;
use crate::models::Principal;
use crate::observability::metrics::{record_token_issuance, record_token_validation};
use crate::observability::ErrorCategory;
use crate::repositories::users;
use chrono::Utc;
use common::secret::{ExposeSecret, SecretString};
use sqlx::SqlitePool;
use std::time::Instant;
use tracing::instrument;

/// A freshly minted access token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl IssuedToken {
    /// Seconds between issue and expiry.
    pub fn expires_in(&self) -> u64 {
        u64::try_from(self.expires_at - self.issued_at).unwrap_or(0)
    }
}

/// Issues and verifies HS256 access tokens.
///
/// Holds only the shared secret and the token lifetime; cloning is cheap
/// enough to keep one per `AppState`.
#[derive(Clone)]
pub struct TokenService {
    secret: SecretString,
    ttl_seconds: i64,
}

impl TokenService {
    pub fn new(config: &Config) -> Self {
        Self::with_secret(config.token_secret.clone(), config.token_ttl_minutes)
    }

    pub fn with_secret(secret: SecretString, ttl_minutes: i64) -> Self {
        Self {
            secret,
            ttl_seconds: ttl_minutes.saturating_mul(60),
        }
    }

    fn secret_bytes(&self) -> &[u8] {
        self.secret.expose_secret().as_bytes()
    }

    /// Issue a token for `principal`, valid from now.
    pub fn issue(&self, principal: &Principal) -> Result<IssuedToken, LmsError> {
        self.issue_at(principal, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now` (unix seconds).
    #[instrument(skip_all)]
    pub fn issue_at(&self, principal: &Principal, now: i64) -> Result<IssuedToken, LmsError> {
        let start = Instant::now();

        let claims = Claims {
            sub: principal.user_id.to_string(),
            username: principal.username.clone(),
            role: principal.role,
            iat: now,
            exp: now + self.ttl_seconds,
        };
        let access_token = crypto::sign_jwt(&claims, self.secret_bytes())?;

        record_token_issuance(start.elapsed());
        tracing::debug!(
            target: "lms.token",
            role = %principal.role,
            exp = claims.exp,
            "Access token issued"
        );

        Ok(IssuedToken {
            access_token,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Result<Principal, LmsError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify a token as if the current time were `now` (unix seconds).
    ///
    /// `ExpiredToken` only when the signature and claims are valid and
    /// `now > exp`; every other failure is `InvalidToken`.
    #[instrument(skip_all)]
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Principal, LmsError> {
        let result = crypto::verify_jwt(token, self.secret_bytes(), now, JWT_CLOCK_SKEW_SECONDS)
            .and_then(|claims| principal_from_claims(&claims));

        match &result {
            Ok(_) => record_token_validation("success", None),
            Err(e) => record_token_validation("error", Some(ErrorCategory::from(e).as_str())),
        }

        result
    }

    /// Verify a token and resolve its subject against the user table.
    ///
    /// The returned principal reflects the stored row, so a role change takes
    /// effect on the next request. A deleted subject is `InvalidToken`.
    pub async fn authenticate(&self, pool: &SqlitePool, token: &str) -> Result<Principal, LmsError> {
        let claimed = self.verify(token)?;

        let user = users::get_by_id(pool, claimed.user_id)
            .await?
            .ok_or_else(|| {
                tracing::debug!(target: "lms.token", "Token subject no longer exists");
                LmsError::InvalidToken("The access token is invalid".to_string())
            })?;

        Ok(Principal::from(&user))
    }
}

fn principal_from_claims(claims: &Claims) -> Result<Principal, LmsError> {
    let user_id = claims.sub.parse::<i64>().map_err(|_| {
        tracing::debug!(target: "lms.token", "Token subject is not a user id");
        LmsError::InvalidToken("The access token is invalid".to_string())
    })?;

    Ok(Principal {
        user_id,
        username: claims.username.clone(),
        role: claims.role,
    })
}
