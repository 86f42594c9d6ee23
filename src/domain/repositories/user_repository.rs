use async_trait::async_trait;

use crate::domain::errors::RepositoryResult;
use crate::domain::user::{Email, NewUser, User};

/// Repository trait for User aggregate
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user, failing with `Conflict` if the email is taken
    async fn create(&self, user: NewUser) -> RepositoryResult<User>;

    /// Find a user by ID
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>>;

    /// Find a user by email address
    async fn find_by_email(&self, email: &Email) -> RepositoryResult<Option<User>>;

    /// Persist profile, email, password and confirmation state
    async fn update(&self, user: &User) -> RepositoryResult<()>;
}
