use async_trait::async_trait;
use sqlx::PgPool;

use super::db_error;
use crate::domain::errors::{RepositoryError, RepositoryResult};
use crate::domain::material::{Material, MaterialDraft};
use crate::domain::repositories::MaterialRepository;

/// PostgreSQL implementation of MaterialRepository
pub struct PostgresMaterialRepository {
    pool: PgPool,
}

impl PostgresMaterialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MaterialRepository for PostgresMaterialRepository {
    async fn create(&self, course_id: i64, draft: MaterialDraft) -> RepositoryResult<Material> {
        sqlx::query_as::<_, Material>(
            r#"
            INSERT INTO materials (course_id, name, filename, kind, publish_at, lecture_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, course_id, name, filename, kind, publish_at, lecture_at
            "#,
        )
        .bind(course_id)
        .bind(&draft.name)
        .bind(&draft.filename)
        .bind(draft.kind)
        .bind(draft.publish_at)
        .bind(draft.lecture_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create material", e))
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Material>> {
        sqlx::query_as::<_, Material>(
            r#"
            SELECT id, course_id, name, filename, kind, publish_at, lecture_at
            FROM materials
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find material by id", e))
    }

    async fn find_by_course(&self, course_id: i64) -> RepositoryResult<Vec<Material>> {
        sqlx::query_as::<_, Material>(
            r#"
            SELECT id, course_id, name, filename, kind, publish_at, lecture_at
            FROM materials
            WHERE course_id = $1
            ORDER BY lecture_at, id
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find materials by course", e))
    }

    async fn update(&self, material: &Material) -> RepositoryResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE materials
            SET name = $2, filename = $3, kind = $4, publish_at = $5, lecture_at = $6
            WHERE id = $1
            "#,
        )
        .bind(material.id)
        .bind(&material.name)
        .bind(&material.filename)
        .bind(material.kind)
        .bind(material.publish_at)
        .bind(material.lecture_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update material", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Material {}", material.id)));
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM materials WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete material", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Material {}", id)));
        }

        Ok(())
    }
}
