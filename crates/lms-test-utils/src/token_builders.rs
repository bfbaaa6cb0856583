//! Builder for hand-made access tokens.
//!
//! Real tokens come from the server; this builder makes the ones the server
//! would never issue: expired, future-dated, signed with the wrong secret,
//! or carrying unusual claims.

use crate::test_ids::TEST_TOKEN_SECRET;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

/// # Example
/// ```rust,ignore
/// let expired = TestTokenBuilder::new()
///     .for_user(7, "alice")
///     .with_role("mahasiswa")
///     .expires_in(-60)
///     .build();
/// ```
pub struct TestTokenBuilder {
    sub: String,
    username: String,
    role: Value,
    iat: i64,
    exp: i64,
    secret: Vec<u8>,
}

impl TestTokenBuilder {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            sub: "1".to_string(),
            username: "test-user".to_string(),
            role: json!("mahasiswa"),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(60)).timestamp(),
            secret: TEST_TOKEN_SECRET.as_bytes().to_vec(),
        }
    }

    pub fn for_user(mut self, user_id: i64, username: &str) -> Self {
        self.sub = user_id.to_string();
        self.username = username.to_string();
        self
    }

    /// Raw subject claim, e.g. a non-numeric one.
    pub fn with_subject(mut self, sub: &str) -> Self {
        self.sub = sub.to_string();
        self
    }

    /// Role wire name; not validated so unknown roles can be tested.
    pub fn with_role(mut self, role: &str) -> Self {
        self.role = json!(role);
        self
    }

    /// Expiry relative to now (negative for an already expired token).
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self
    }

    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.iat = timestamp;
        self
    }

    pub fn signed_with(mut self, secret: &str) -> Self {
        self.secret = secret.as_bytes().to_vec();
        self
    }

    pub fn claims(&self) -> Value {
        json!({
            "sub": self.sub,
            "username": self.username,
            "role": self.role,
            "iat": self.iat,
            "exp": self.exp,
        })
    }

    /// Sign the claims with HS256.
    pub fn build(self) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &self.claims(),
            &EncodingKey::from_secret(&self.secret),
        )
        .expect("HS256 signing of JSON claims cannot fail")
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
