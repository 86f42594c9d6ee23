// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

pub mod in_memory;
pub mod postgres_course_repository;
pub mod postgres_enrollment_repository;
pub mod postgres_group_repository;
pub mod postgres_material_repository;
pub mod postgres_user_repository;

pub use in_memory::InMemoryStore;
pub use postgres_course_repository::PostgresCourseRepository;
pub use postgres_enrollment_repository::PostgresEnrollmentRepository;
pub use postgres_group_repository::PostgresGroupRepository;
pub use postgres_material_repository::PostgresMaterialRepository;
pub use postgres_user_repository::PostgresUserRepository;

use crate::domain::errors::RepositoryError;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Maps a SQLx failure onto the repository error taxonomy
pub(crate) fn db_error(context: &str, e: sqlx::Error) -> RepositoryError {
    let code = e
        .as_database_error()
        .and_then(|db| db.code())
        .map(|c| c.into_owned());

    match code.as_deref() {
        Some(UNIQUE_VIOLATION) => RepositoryError::Conflict(format!("{}: {}", context, e)),
        Some(FOREIGN_KEY_VIOLATION) => {
            RepositoryError::NotFound(format!("{}: referenced row", context))
        }
        _ => RepositoryError::Database(format!("{}: {}", context, e)),
    }
}
