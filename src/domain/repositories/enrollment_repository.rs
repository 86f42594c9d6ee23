use async_trait::async_trait;

use crate::domain::course::{CourseRole, Enrollment};
use crate::domain::errors::RepositoryResult;

/// Repository trait for course enrollments
///
/// Lookups must reflect the latest committed enrollment state; the access
/// gate relies on that for every decision.
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// The enrollment row of `user_id` in `course_id`, if any
    async fn find(&self, user_id: i64, course_id: i64) -> RepositoryResult<Option<Enrollment>>;

    /// Enrollments of a course whose role is in `roles`
    ///
    /// An empty `roles` slice matches every role.
    async fn list(&self, course_id: i64, roles: &[CourseRole]) -> RepositoryResult<Vec<Enrollment>>;

    /// Every enrollment held by `user_id`
    async fn list_for_user(&self, user_id: i64) -> RepositoryResult<Vec<Enrollment>>;

    /// Fails with `Conflict` if the user is already enrolled
    async fn enroll(&self, user_id: i64, course_id: i64, role: CourseRole) -> RepositoryResult<()>;

    /// Fails with `NotFound` if there was no enrollment
    async fn disenroll(&self, user_id: i64, course_id: i64) -> RepositoryResult<()>;

    /// Fails with `NotFound` if there was no enrollment
    async fn change_role(&self, user_id: i64, course_id: i64, role: CourseRole) -> RepositoryResult<()>;
}
