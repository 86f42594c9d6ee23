use async_trait::async_trait;

use crate::domain::errors::RepositoryResult;
use crate::domain::group::{Group, GroupDraft};

/// Repository trait for Group aggregate
#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn create(&self, course_id: i64, draft: GroupDraft) -> RepositoryResult<Group>;

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Group>>;

    /// Groups of a course ordered by id
    async fn find_by_course(&self, course_id: i64) -> RepositoryResult<Vec<Group>>;

    async fn update(&self, group: &Group) -> RepositoryResult<()>;

    /// Fails with `NotFound` if nothing was deleted
    async fn delete(&self, id: i64) -> RepositoryResult<()>;

    /// The group in `course_id` that `user_id` is a member of
    async fn find_for_member(&self, course_id: i64, user_id: i64) -> RepositoryResult<Option<Group>>;

    /// The first group in `course_id` led by `tutor_id`
    async fn find_for_tutor(&self, course_id: i64, tutor_id: i64) -> RepositoryResult<Option<Group>>;

    /// Makes `user_id` a member of `group_id`, leaving any other group of the same course
    async fn assign_member(&self, group_id: i64, user_id: i64) -> RepositoryResult<()>;
}
