use async_trait::async_trait;
use sqlx::PgPool;

use super::db_error;
use crate::domain::course::{CourseRole, Enrollment};
use crate::domain::errors::{RepositoryError, RepositoryResult};
use crate::domain::repositories::EnrollmentRepository;

const ENROLLMENT_COLUMNS: &str = r#"
    uc.user_id, uc.course_id, uc.role,
    u.first_name, u.last_name, u.email,
    u.student_number, u.semester, u.subject
"#;

/// PostgreSQL implementation of EnrollmentRepository
///
/// Enrollments live in `user_course` and are joined with `users` for the
/// profile columns.
pub struct PostgresEnrollmentRepository {
    pool: PgPool,
}

impl PostgresEnrollmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EnrollmentRepository for PostgresEnrollmentRepository {
    async fn find(&self, user_id: i64, course_id: i64) -> RepositoryResult<Option<Enrollment>> {
        let sql = format!(
            "SELECT {} FROM user_course uc INNER JOIN users u ON u.id = uc.user_id \
             WHERE uc.user_id = $1 AND uc.course_id = $2 LIMIT 1",
            ENROLLMENT_COLUMNS
        );

        sqlx::query_as::<_, Enrollment>(&sql)
            .bind(user_id)
            .bind(course_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find enrollment", e))
    }

    async fn list(&self, course_id: i64, roles: &[CourseRole]) -> RepositoryResult<Vec<Enrollment>> {
        let roles: Vec<i16> = roles.iter().map(|r| i16::from(*r)).collect();
        let sql = format!(
            "SELECT {} FROM user_course uc INNER JOIN users u ON u.id = uc.user_id \
             WHERE uc.course_id = $1 \
               AND (cardinality($2::smallint[]) = 0 OR uc.role = ANY($2)) \
             ORDER BY uc.user_id",
            ENROLLMENT_COLUMNS
        );

        sqlx::query_as::<_, Enrollment>(&sql)
            .bind(course_id)
            .bind(roles)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list enrollments", e))
    }

    async fn list_for_user(&self, user_id: i64) -> RepositoryResult<Vec<Enrollment>> {
        let sql = format!(
            "SELECT {} FROM user_course uc INNER JOIN users u ON u.id = uc.user_id \
             WHERE uc.user_id = $1 ORDER BY uc.course_id",
            ENROLLMENT_COLUMNS
        );

        sqlx::query_as::<_, Enrollment>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list enrollments of user", e))
    }

    async fn enroll(&self, user_id: i64, course_id: i64, role: CourseRole) -> RepositoryResult<()> {
        sqlx::query("INSERT INTO user_course (user_id, course_id, role) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(course_id)
            .bind(role)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to enroll user", e))?;

        Ok(())
    }

    async fn disenroll(&self, user_id: i64, course_id: i64) -> RepositoryResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to start transaction", e))?;

        let result = sqlx::query("DELETE FROM user_course WHERE user_id = $1 AND course_id = $2")
            .bind(user_id)
            .bind(course_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to disenroll user", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Enrollment of user {} in course {}",
                user_id, course_id
            )));
        }

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
        .map_err(|e| db_error("Failed to leave course groups", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit disenrollment", e))
    }

    async fn change_role(&self, user_id: i64, course_id: i64, role: CourseRole) -> RepositoryResult<()> {
        let result =
            sqlx::query("UPDATE user_course SET role = $3 WHERE user_id = $1 AND course_id = $2")
                .bind(user_id)
                .bind(course_id)
                .bind(role)
                .execute(&self.pool)
                .await
                .map_err(|e| db_error("Failed to change role", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Enrollment of user {} in course {}",
                user_id, course_id
            )));
        }

        Ok(())
    }
}
