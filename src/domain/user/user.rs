use serde::{Deserialize, Serialize};

use super::value_objects::Email;
use crate::domain::errors::{require_text, ValidationError};

/// A registered account together with its profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub student_number: String,
    pub semester: i32,
    pub subject: String,
    pub language: String,
    pub root: bool,
    pub encrypted_password: String,
    /// Pending email confirmation token, `None` once confirmed
    pub confirm_email_token: Option<String>,
}

/// A user that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub profile: ProfileDraft,
    pub email: Email,
    pub encrypted_password: String,
    pub confirm_email_token: Option<String>,
    pub root: bool,
}

/// Login credentials sent when creating or editing an account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDraft {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub plain_password: String,
}

impl AccountDraft {
    /// Validates the credentials of a brand new account
    pub fn validate_new(&self, min_password_length: usize) -> Result<Email, ValidationError> {
        let email = Email::new(self.email.clone().unwrap_or_default())?;
        validate_password(&self.plain_password, min_password_length)?;
        Ok(email)
    }
}

/// Checks a plaintext password against the configured minimum length
pub fn validate_password(password: &str, min_length: usize) -> Result<(), ValidationError> {
    if password.chars().count() < min_length {
        return Err(ValidationError::PasswordTooShort(min_length));
    }
    Ok(())
}

/// Profile fields of an account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDraft {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub student_number: String,
    #[serde(default)]
    pub semester: i32,
    #[serde(default)]
    pub subject: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en".to_string()
}

impl ProfileDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("first_name", &self.first_name)?;
        require_text("last_name", &self.last_name)?;

        if self.semester < 0 {
            return Err(ValidationError::OutOfRange {
                field: "semester",
                reason: "semester cannot be negative".to_string(),
            });
        }

        Ok(())
    }
}

impl User {
    pub fn apply_profile(&mut self, profile: ProfileDraft) {
        self.first_name = profile.first_name;
        self.last_name = profile.last_name;
        self.student_number = profile.student_number;
        self.semester = profile.semester;
        self.subject = profile.subject;
        self.language = profile.language;
    }

    /// Switches to a new address and requires it to be confirmed again
    pub fn change_email(&mut self, email: Email, confirm_token: String) {
        self.email = email;
        self.confirm_email_token = Some(confirm_token);
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirm_email_token.is_none()
    }

    /// Clears the pending token if `token` matches it
    pub fn confirm_email(&mut self, token: &str) -> Result<(), ValidationError> {
        match self.confirm_email_token.as_deref() {
            Some(expected) if expected == token => {
                self.confirm_email_token = None;
                Ok(())
            }
            Some(_) => Err(ValidationError::Rejected(
                "Invalid confirmation token".to_string(),
            )),
            None => Err(ValidationError::Rejected(
                "Email already confirmed".to_string(),
            )),
        }
    }
}
