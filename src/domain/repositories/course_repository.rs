use async_trait::async_trait;

use crate::domain::course::{Course, CourseDraft};
use crate::domain::errors::RepositoryResult;

/// Repository trait for Course aggregate
///
/// Deleting a course also removes its enrollments, groups and materials.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn create(&self, draft: CourseDraft) -> RepositoryResult<Course>;

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Course>>;

    /// All courses ordered by id
    async fn find_all(&self) -> RepositoryResult<Vec<Course>>;

    async fn update(&self, course: &Course) -> RepositoryResult<()>;

    /// Fails with `NotFound` if nothing was deleted
    async fn delete(&self, id: i64) -> RepositoryResult<()>;
}
