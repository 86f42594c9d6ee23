use async_trait::async_trait;
use sqlx::PgPool;

use super::db_error;
use crate::domain::errors::{RepositoryError, RepositoryResult};
use crate::domain::group::{Group, GroupDraft};
use crate::domain::repositories::GroupRepository;

/// PostgreSQL implementation of GroupRepository
pub struct PostgresGroupRepository {
    pool: PgPool,
}

impl PostgresGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn create(&self, course_id: i64, draft: GroupDraft) -> RepositoryResult<Group> {
        sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO course_groups (tutor_id, course_id, description)
            VALUES ($1, $2, $3)
            RETURNING id, tutor_id, course_id, description
            "#,
        )
        .bind(draft.tutor_id)
        .bind(course_id)
        .bind(&draft.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create group", e))
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Group>> {
        sqlx::query_as::<_, Group>(
            "SELECT id, tutor_id, course_id, description FROM course_groups WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find group by id", e))
    }

    async fn find_by_course(&self, course_id: i64) -> RepositoryResult<Vec<Group>> {
        sqlx::query_as::<_, Group>(
            r#"
            SELECT id, tutor_id, course_id, description
            FROM course_groups
            WHERE course_id = $1
            ORDER BY id
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find groups by course", e))
    }

    async fn update(&self, group: &Group) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE course_groups SET tutor_id = $2, description = $3 WHERE id = $1",
        )
        .bind(group.id)
        .bind(group.tutor_id)
        .bind(&group.description)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update group", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Group {}", group.id)));
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM course_groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete group", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Group {}", id)));
        }

        Ok(())
    }

    async fn find_for_member(&self, course_id: i64, user_id: i64) -> RepositoryResult<Option<Group>> {
        sqlx::query_as::<_, Group>(
            r#"
            SELECT g.id, g.tutor_id, g.course_id, g.description
            FROM user_group ug
            INNER JOIN course_groups g ON g.id = ug.group_id
            WHERE ug.user_id = $1 AND g.course_id = $2
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find group of member", e))
    }

    async fn find_for_tutor(&self, course_id: i64, tutor_id: i64) -> RepositoryResult<Option<Group>> {
        sqlx::query_as::<_, Group>(
            r#"
            SELECT id, tutor_id, course_id, description
            FROM course_groups
            WHERE tutor_id = $1 AND course_id = $2
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(tutor_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find group of tutor", e))
    }

    async fn assign_member(&self, group_id: i64, user_id: i64) -> RepositoryResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to start transaction", e))?;

        let course_id: Option<i64> =
            sqlx::query_scalar("SELECT course_id FROM course_groups WHERE id = $1")
                .bind(group_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| db_error("Failed to find group", e))?;
        let course_id =
            course_id.ok_or_else(|| RepositoryError::NotFound(format!("Group {}", group_id)))?;

        sqlx::query(
            r#"
            DELETE FROM user_group ug
            USING course_groups g
            WHERE ug.group_id = g.id AND ug.user_id = $1 AND g.course_id = $2
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to leave previous group", e))?;

        sqlx::query("INSERT INTO user_group (user_id, group_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(group_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to join group", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit group assignment", e))
    }
}
