use serde::{Deserialize, Serialize};

use crate::domain::errors::{require_text, ValidationError};

/// An exercise group inside a course, led by one tutor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: i64,
    pub tutor_id: i64,
    pub course_id: i64,
    pub description: String,
}

/// Client supplied fields of a group
///
/// The owning course always comes from the route, never from the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDraft {
    pub tutor_id: i64,
    #[serde(default)]
    pub description: String,
}

impl GroupDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.tutor_id <= 0 {
            return Err(ValidationError::OutOfRange {
                field: "tutor_id",
                reason: "a group needs a tutor".to_string(),
            });
        }
        require_text("description", &self.description)
    }
}

impl Group {
    pub fn apply(&mut self, draft: GroupDraft) {
        self.tutor_id = draft.tutor_id;
        self.description = draft.description;
    }
}
