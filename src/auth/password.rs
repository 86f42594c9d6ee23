// Account password hashing, bcrypt at the default cost

use bcrypt::{hash, verify, DEFAULT_COST};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(bcrypt::BcryptError),

    /// The stored value is not a bcrypt hash
    #[error("stored password hash is unreadable: {0}")]
    MalformedHash(bcrypt::BcryptError),
}

/// Hashes a plaintext password for storage
///
/// # Example
/// ```
/// use lecturehall_api::auth::password::hash_password;
///
/// let hash = hash_password("my_password").expect("valid hash");
/// assert!(hash.starts_with("$2"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash(password, DEFAULT_COST).map_err(PasswordError::Hash)
}

/// Checks `password` against a stored hash
///
/// The cost is read from the hash itself, so hashes made with a lower cost
/// still verify.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    verify(password, stored).map_err(PasswordError::MalformedHash)
}
