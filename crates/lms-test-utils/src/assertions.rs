//! Custom test assertions for access tokens.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct JwtHeader {
    pub alg: String,
}

#[derive(Debug, Deserialize)]
struct JwtClaims {
    pub sub: String,
    pub username: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Assertions on an access token string. They inspect the token without
/// checking its signature.
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jwt()
///     .assert_has_role("dosen")
///     .assert_lifetime_secs(3600);
/// ```
pub trait TokenAssertions {
    /// Three base64url segments with an HS256 header.
    fn assert_valid_jwt(&self) -> &Self;

    fn assert_has_role(&self, role: &str) -> &Self;

    fn assert_for_user(&self, user_id: i64, username: &str) -> &Self;

    /// `exp - iat` equals `seconds`.
    fn assert_lifetime_secs(&self, seconds: i64) -> &Self;
}

fn decode_segment<T: for<'de> Deserialize<'de>>(token: &str, index: usize) -> T {
    let segment = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("JWT is missing segment {}", index));
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .unwrap_or_else(|e| panic!("Failed to base64 decode JWT segment {}: {}", index, e));
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("Failed to parse JWT segment {} JSON: {}", index, e))
}

fn claims(token: &str) -> JwtClaims {
    decode_segment(token, 1)
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        let parts = self.split('.').count();
        assert_eq!(
            parts, 3,
            "JWT must have 3 parts (header.payload.signature), got {}",
            parts
        );

        let header: JwtHeader = decode_segment(self, 0);
        assert_eq!(header.alg, "HS256", "Expected HS256 algorithm");

        let _ = claims(self);
        self
    }

    fn assert_has_role(&self, role: &str) -> &Self {
        let claims = claims(self);
        assert_eq!(claims.role, role, "Unexpected role claim");
        self
    }

    fn assert_for_user(&self, user_id: i64, username: &str) -> &Self {
        let claims = claims(self);
        assert_eq!(claims.sub, user_id.to_string(), "Unexpected subject");
        assert_eq!(claims.username, username, "Unexpected username claim");
        self
    }

    fn assert_lifetime_secs(&self, seconds: i64) -> &Self {
        let claims = claims(self);
        assert_eq!(
            claims.exp - claims.iat,
            seconds,
            "Token lifetime should be {} seconds",
            seconds
        );
        self
    }
}
