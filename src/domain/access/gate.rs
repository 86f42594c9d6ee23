use thiserror::Error;

use super::resolver::{resolve_role, RoleResolution};
use crate::domain::course::CourseRole;
use crate::domain::errors::RepositoryError;
use crate::domain::principal::Principal;
use crate::domain::repositories::EnrollmentRepository;

/// Reasons a principal may not act on a course
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("Access denied. Not enrolled in course {course_id}")]
    NotEnrolled { course_id: i64 },

    #[error("Access denied. Required roles: {required:?}, but user has role: {actual}")]
    InsufficientRole {
        required: Vec<CourseRole>,
        actual: CourseRole,
    },

    #[error("Access denied. Only global administrators can access this resource")]
    RootRequired,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Pure access decision for an already resolved role
///
/// Returns the effective role on success. Root principals are admins
/// regardless of `resolution`.
///
/// # Example
/// ```
/// use lecturehall_api::domain::access::{decide, RoleResolution};
/// use lecturehall_api::domain::course::CourseRole;
/// use lecturehall_api::domain::principal::Principal;
///
/// let student = Principal::new(112, false);
/// let role = decide(
///     &student,
///     1,
///     RoleResolution::Enrolled(CourseRole::Student),
///     &[CourseRole::Student, CourseRole::Tutor],
/// );
/// assert_eq!(role, Ok(CourseRole::Student));
///
/// assert!(decide(&student, 1, RoleResolution::NotEnrolled, &[CourseRole::Student]).is_err());
/// ```
pub fn decide(
    principal: &Principal,
    course_id: i64,
    resolution: RoleResolution,
    required: &[CourseRole],
) -> Result<CourseRole, AccessError> {
    if principal.is_root {
        return Ok(CourseRole::Admin);
    }

    let role = match resolution {
        RoleResolution::Enrolled(role) => role,
        RoleResolution::NotEnrolled => return Err(AccessError::NotEnrolled { course_id }),
    };

    if required.contains(&role) {
        Ok(role)
    } else {
        Err(AccessError::InsufficientRole {
            required: required.to_vec(),
            actual: role,
        })
    }
}

/// Checks that `principal` holds one of `required` in `course_id`
///
/// Root principals are allowed without touching the store.
pub async fn authorize(
    enrollments: &dyn EnrollmentRepository,
    principal: &Principal,
    course_id: i64,
    required: &[CourseRole],
) -> Result<CourseRole, AccessError> {
    if principal.is_root {
        return Ok(CourseRole::Admin);
    }

    let resolution = resolve_role(enrollments, principal.user_id, course_id).await?;
    let decision = decide(principal, course_id, resolution, required);

    if let Err(reason) = &decision {
        tracing::debug!(
            user_id = principal.user_id,
            course_id,
            %reason,
            "course access denied"
        );
    }

    decision
}

/// Operations that exist outside any course, such as creating one
pub fn require_root(principal: &Principal) -> Result<(), AccessError> {
    if principal.is_root {
        Ok(())
    } else {
        Err(AccessError::RootRequired)
    }
}
