use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::errors::ValidationError;

/// Email value object representing a plausible email address
///
/// # Invariants
/// - Must contain '@' character
/// - Must be at least 3 characters long
/// - Stored trimmed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Creates a new Email value object
    ///
    /// # Example
    /// ```
    /// use lecturehall_api::domain::user::value_objects::Email;
    ///
    /// let email = Email::new("test@uni-tuebingen.de").expect("valid email");
    /// assert_eq!(email.as_str(), "test@uni-tuebingen.de");
    /// ```
    pub fn new(email: impl Into<String>) -> Result<Self, ValidationError> {
        let email = email.into().trim().to_string();
        if Self::is_valid(&email) {
            Ok(Email(email))
        } else {
            Err(ValidationError::InvalidEmail(email))
        }
    }

    fn is_valid(email: &str) -> bool {
        email.contains('@') && email.len() >= 3
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Email::new(value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_email() {
        assert!(Email::new("test@example.com").is_ok());
    }

    #[test]
    fn valid_email_minimum_length() {
        assert!(Email::new("a@b").is_ok());
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let email = Email::new("  foo@test.com ").unwrap();
        assert_eq!(email.as_str(), "foo@test.com");
    }

    #[test]
    fn invalid_email_no_at_symbol() {
        assert!(Email::new("foo").is_err());
    }

    #[test]
    fn invalid_email_too_short() {
        assert!(Email::new("a@").is_err());
    }

    #[test]
    fn invalid_email_empty() {
        assert_eq!(
            Email::new(""),
            Err(ValidationError::InvalidEmail(String::new()))
        );
    }

    #[test]
    fn deserialize_validates() {
        assert!(serde_json::from_str::<Email>("\"foo@test.com\"").is_ok());
        assert!(serde_json::from_str::<Email>("\"foo\"").is_err());
    }
}
