//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports the [`secrecy`] types used for passwords and the token
//! signing secret. `SecretString` redacts itself in `Debug`, so a request
//! struct that derives `Debug` stays safe to log with `{:?}` or in a
//! tracing field.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct LoginRequest {
//!     username: String,
//!     password: SecretString,
//! }
//!
//! let req = LoginRequest {
//!     username: "alice".to_string(),
//!     password: SecretString::from("hunter2"),
//! };
//!
//! assert!(!format!("{req:?}").contains("hunter2"));
//! assert_eq!(req.password.expose_secret(), "hunter2");
//! ```
//!
//! Use `SecretString` for user passwords, the JWT signing secret and bearer
//! tokens held outside the request path.

pub use secrecy::{ExposeSecret, SecretBox, SecretString};
