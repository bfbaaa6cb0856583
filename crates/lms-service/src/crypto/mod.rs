use crate::config::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use crate::errors::LmsError;
use common::types::Role;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::instrument;

/// Maximum allowed JWT size in bytes (4KB).
///
/// Tokens above this size are rejected before base64 decoding or signature
/// checks. A normal access token is well under 300 bytes.
pub const MAX_JWT_SIZE_BYTES: usize = 4096;

/// Tolerance for `iat` values slightly ahead of the verifier's clock.
pub const JWT_CLOCK_SKEW_SECONDS: i64 = 300;

/// Bcrypt hash verified when the username does not exist, so that unknown
/// and known usernames take the same time to reject.
pub const DUMMY_PASSWORD_HASH: &str =
    "$2b$12$LQv3c1yqBWVHxkd0LHAkCOYz6TtxMQJqhN8/LewY5GyYqExt7YD3a";

const INVALID_TOKEN_MESSAGE: &str = "The access token is invalid";

/// JWT claims carried by an access token.
///
/// `sub` and `username` identify a person and are redacted from `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User id (decimal)
    pub username: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("sub", &"[REDACTED]")
            .field("username", &"[REDACTED]")
            .field("role", &self.role)
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .finish()
    }
}

/// Sign claims with HMAC-SHA256.
#[instrument(skip_all)]
pub fn sign_jwt(claims: &Claims, secret: &[u8]) -> Result<String, LmsError> {
    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some("JWT".to_string());

    encode(&header, claims, &EncodingKey::from_secret(secret))
        .map_err(|e| LmsError::Crypto(format!("JWT signing operation failed: {}", e)))
}

/// Verify an HS256 JWT at time `now` (unix seconds).
///
/// Checks run in this order:
/// - size (must be <= MAX_JWT_SIZE_BYTES)
/// - envelope, signature and claim shape
/// - `iat` not more than `clock_skew_seconds` ahead of `now`
/// - expiry: `now > exp` yields `ExpiredToken`
///
/// Expiry is checked last so a forged token never reports "expired".
#[instrument(skip_all)]
pub fn verify_jwt(
    token: &str,
    secret: &[u8],
    now: i64,
    clock_skew_seconds: i64,
) -> Result<Claims, LmsError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "lms.crypto",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(LmsError::InvalidToken(INVALID_TOKEN_MESSAGE.to_string()));
    }

    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is evaluated against the caller's clock below.
    validation.validate_exp = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let token_data =
        decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation).map_err(|e| {
            let reason = match e.kind() {
                ErrorKind::InvalidSignature => "signature",
                ErrorKind::InvalidAlgorithm => "algorithm",
                ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => "claims",
                _ => "malformed",
            };
            tracing::debug!(target: "lms.crypto", reason = reason, "Token verification failed");
            LmsError::InvalidToken(INVALID_TOKEN_MESSAGE.to_string())
        })?;

    let claims = token_data.claims;

    let max_iat = now + clock_skew_seconds;
    if claims.iat > max_iat {
        tracing::debug!(
            target: "lms.crypto",
            iat = claims.iat,
            now = now,
            max_allowed = max_iat,
            "Token rejected: iat too far in the future"
        );
        return Err(LmsError::InvalidToken(INVALID_TOKEN_MESSAGE.to_string()));
    }

    if now > claims.exp {
        tracing::debug!(
            target: "lms.crypto",
            exp = claims.exp,
            now = now,
            "Token rejected: expired"
        );
        return Err(LmsError::ExpiredToken);
    }

    Ok(claims)
}

/// Hash a password with bcrypt.
///
/// # Errors
///
/// Returns `LmsError::Crypto` if the cost is outside
/// `MIN_BCRYPT_COST..=MAX_BCRYPT_COST` or hashing fails.
#[instrument(skip_all)]
pub fn hash_password(password: &str, cost: u32) -> Result<String, LmsError> {
    if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
        return Err(LmsError::Crypto(format!(
            "Invalid bcrypt cost: {} (must be {}-{})",
            cost, MIN_BCRYPT_COST, MAX_BCRYPT_COST
        )));
    }

    bcrypt::hash(password, cost)
        .map_err(|e| LmsError::Crypto(format!("Password hashing failed: {}", e)))
}

/// Verify a password against a bcrypt hash
#[instrument(skip_all)]
pub fn verify_password(password: &str, hash: &str) -> Result<bool, LmsError> {
    bcrypt::verify(password, hash)
        .map_err(|e| LmsError::Crypto(format!("Password verification failed: {}", e)))
}
