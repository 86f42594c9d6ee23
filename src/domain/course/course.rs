use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::{require_text, ValidationError};

/// A course as stored by the persistence layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub begins_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub required_percentage: i32,
}

/// Client supplied fields of a course, used for create and update
///
/// # Invariants
/// - Name cannot be empty
/// - `ends_at` is not before `begins_at`
/// - `required_percentage` lies in `0..=100`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub begins_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub required_percentage: i32,
}

impl CourseDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;

        if self.ends_at < self.begins_at {
            return Err(ValidationError::OutOfRange {
                field: "ends_at",
                reason: "course cannot end before it begins".to_string(),
            });
        }

        if !(0..=100).contains(&self.required_percentage) {
            return Err(ValidationError::OutOfRange {
                field: "required_percentage",
                reason: format!("{} is not within 0..=100", self.required_percentage),
            });
        }

        Ok(())
    }
}

impl Course {
    /// Overwrites the editable fields with a validated draft
    pub fn apply(&mut self, draft: CourseDraft) {
        self.name = draft.name;
        self.description = draft.description;
        self.begins_at = draft.begins_at;
        self.ends_at = draft.ends_at;
        self.required_percentage = draft.required_percentage;
    }
}
