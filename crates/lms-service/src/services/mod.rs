//! Business logic layer.
//!
//! - `token_service` - access token issue/verify
//! - `access_policy` - role gate
//! - `rate_limiter` - fixed-window login limiter
//! - `course_cache` - cache-aside over the shared store
//! - `user_service`, `course_service`, `submission_service` - domain operations

pub mod access_policy;
pub mod course_cache;
pub mod course_service;
pub mod rate_limiter;
pub mod submission_service;
pub mod token_service;
pub mod user_service;
