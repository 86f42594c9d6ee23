use crate::domain::course::CourseRole;
use crate::domain::errors::RepositoryResult;
use crate::domain::repositories::EnrollmentRepository;

/// Outcome of looking up a user's role in a course
///
/// `NotEnrolled` is a distinct state. It is never treated as `Student`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleResolution {
    Enrolled(CourseRole),
    NotEnrolled,
}

/// Looks up the enrollment row for `(user_id, course_id)`
pub async fn resolve_role(
    enrollments: &dyn EnrollmentRepository,
    user_id: i64,
    course_id: i64,
) -> RepositoryResult<RoleResolution> {
    let resolution = match enrollments.find(user_id, course_id).await? {
        Some(enrollment) => RoleResolution::Enrolled(enrollment.role),
        None => RoleResolution::NotEnrolled,
    };
    Ok(resolution)
}
