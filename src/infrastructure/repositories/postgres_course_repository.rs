use async_trait::async_trait;
use sqlx::PgPool;

use super::db_error;
use crate::domain::course::{Course, CourseDraft};
use crate::domain::errors::{RepositoryError, RepositoryResult};
use crate::domain::repositories::CourseRepository;

/// PostgreSQL implementation of CourseRepository
///
/// Enrollments, groups and materials reference courses with
/// `ON DELETE CASCADE`, so deleting a course removes them too.
pub struct PostgresCourseRepository {
    pool: PgPool,
}

impl PostgresCourseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CourseRepository for PostgresCourseRepository {
    async fn create(&self, draft: CourseDraft) -> RepositoryResult<Course> {
        sqlx::query_as::<_, Course>(
            r#"
            INSERT INTO courses (name, description, begins_at, ends_at, required_percentage)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, begins_at, ends_at, required_percentage
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.begins_at)
        .bind(draft.ends_at)
        .bind(draft.required_percentage)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create course", e))
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Course>> {
        sqlx::query_as::<_, Course>(
            r#"
            SELECT id, name, description, begins_at, ends_at, required_percentage
            FROM courses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find course by id", e))
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Course>> {
        sqlx::query_as::<_, Course>(
            r#"
            SELECT id, name, description, begins_at, ends_at, required_percentage
            FROM courses
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list courses", e))
    }

    async fn update(&self, course: &Course) -> RepositoryResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE courses
            SET name = $2, description = $3, begins_at = $4, ends_at = $5,
                required_percentage = $6, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(course.id)
        .bind(&course.name)
        .bind(&course.description)
        .bind(course.begins_at)
        .bind(course.ends_at)
        .bind(course.required_percentage)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update course", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Course {}", course.id)));
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete course", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Course {}", id)));
        }

        Ok(())
    }
}
