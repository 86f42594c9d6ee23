use async_trait::async_trait;

use crate::domain::errors::RepositoryResult;
use crate::domain::material::{Material, MaterialDraft};

/// Repository trait for course materials
#[async_trait]
pub trait MaterialRepository: Send + Sync {
    async fn create(&self, course_id: i64, draft: MaterialDraft) -> RepositoryResult<Material>;

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Material>>;

    /// Materials of a course ordered by lecture time
    async fn find_by_course(&self, course_id: i64) -> RepositoryResult<Vec<Material>>;

    async fn update(&self, material: &Material) -> RepositoryResult<()>;

    /// Fails with `NotFound` if nothing was deleted
    async fn delete(&self, id: i64) -> RepositoryResult<()>;
}
