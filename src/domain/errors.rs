use thiserror::Error;

/// Errors raised by repository implementations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Errors raised when a payload violates a business rule
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    #[error("{field} is out of range: {reason}")]
    OutOfRange { field: &'static str, reason: String },

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("{0}")]
    Rejected(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Checks that a required text field carries something other than whitespace
pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_text_rejects_whitespace() {
        assert_eq!(
            require_text("name", "   "),
            Err(ValidationError::EmptyField("name"))
        );
        assert!(require_text("name", "Info2").is_ok());
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            RepositoryError::NotFound("Course 7".to_string()).to_string(),
            "Course 7 not found"
        );
        assert_eq!(
            ValidationError::PasswordTooShort(7).to_string(),
            "Password must be at least 7 characters"
        );
    }
}
