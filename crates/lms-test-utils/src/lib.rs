//! # LMS Test Utilities
//!
//! Shared test utilities for the LMS service:
//! - Server test harness (`TestLmsServer` for E2E tests)
//! - Token builders (`TestTokenBuilder` for forged, expired or odd tokens)
//! - Custom assertions (`TokenAssertions` trait)
//! - Fixed test constants
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lms_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let server = TestLmsServer::spawn().await?;
//!     let token = server.token_for("alice", Role::Student).await?;
//!
//!     token.assert_valid_jwt().assert_has_role("mahasiswa");
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod server_harness;
pub mod test_ids;
pub mod token_builders;

pub use assertions::*;
pub use server_harness::*;
pub use test_ids::*;
pub use token_builders::*;
