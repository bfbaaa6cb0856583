//! Role gate evaluated before every protected operation.

use crate::errors::LmsError;
use crate::models::Principal;
use common::types::Role;

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Administrators and instructors.
pub const STAFF: &[Role] = &[Role::Admin, Role::Instructor];

pub const STUDENTS_ONLY: &[Role] = &[Role::Student];

pub const ANY_ROLE: &[Role] = &Role::ALL;

/// Return the principal if its role is in `allowed`.
///
/// # Errors
///
/// - `Unauthenticated` when there is no principal
/// - `Forbidden` when the role is not allowed
pub fn require<'a>(
    principal: Option<&'a Principal>,
    allowed: &[Role],
) -> Result<&'a Principal, LmsError> {
    let principal = principal.ok_or(LmsError::Unauthenticated)?;

    if allowed.contains(&principal.role) {
        Ok(principal)
    } else {
        tracing::debug!(
            target: "lms.access",
            provided = %principal.role,
            "Role not permitted"
        );
        Err(LmsError::Forbidden {
            required: allowed.to_vec(),
            provided: principal.role,
        })
    }
}
