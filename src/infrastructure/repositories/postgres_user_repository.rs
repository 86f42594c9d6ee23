use async_trait::async_trait;
use sqlx::PgPool;

use super::db_error;
use crate::domain::errors::{RepositoryError, RepositoryResult};
use crate::domain::repositories::UserRepository;
use crate::domain::user::{Email, NewUser, User};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
    student_number: String,
    semester: i32,
    subject: String,
    language: String,
    root: bool,
    encrypted_password: String,
    confirm_email_token: Option<String>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let email = Email::new(&r.email)
            .map_err(|e| RepositoryError::Database(format!("Invalid email from database: {}", e)))?;

        Ok(User {
            id: r.id,
            first_name: r.first_name,
            last_name: r.last_name,
            email,
            student_number: r.student_number,
            semester: r.semester,
            subject: r.subject,
            language: r.language,
            root: r.root,
            encrypted_password: r.encrypted_password,
            confirm_email_token: r.confirm_email_token,
        })
    }
}

const USER_COLUMNS: &str = r#"
    id, first_name, last_name, email, student_number, semester, subject,
    language, root, encrypted_password, confirm_email_token
"#;

/// PostgreSQL implementation of UserRepository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a new PostgresUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: NewUser) -> RepositoryResult<User> {
        let sql = format!(
            "INSERT INTO users (first_name, last_name, email, student_number, semester, subject, \
             language, root, encrypted_password, confirm_email_token) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {}",
            USER_COLUMNS
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.profile.first_name)
            .bind(&user.profile.last_name)
            .bind(user.email.as_str())
            .bind(&user.profile.student_number)
            .bind(user.profile.semester)
            .bind(&user.profile.subject)
            .bind(&user.profile.language)
            .bind(user.root)
            .bind(&user.encrypted_password)
            .bind(&user.confirm_email_token)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to create user", e))?;

        row.try_into()
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find user by id", e))?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_email(&self, email: &Email) -> RepositoryResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);

        sqlx::query_as::<_, UserRow>(&sql)
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find user by email", e))?
            .map(User::try_from)
            .transpose()
    }

    async fn update(&self, user: &User) -> RepositoryResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET first_name = $2, last_name = $3, email = $4, student_number = $5,
                semester = $6, subject = $7, language = $8, encrypted_password = $9,
                confirm_email_token = $10, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.email.as_str())
        .bind(&user.student_number)
        .bind(user.semester)
        .bind(&user.subject)
        .bind(&user.language)
        .bind(&user.encrypted_password)
        .bind(&user.confirm_email_token)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update user", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("User {}", user.id)));
        }

        Ok(())
    }
}
