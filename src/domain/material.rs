use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::{require_text, ValidationError};

/// What a material is used for
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type,
)]
#[serde(into = "i16", try_from = "i16")]
#[repr(i16)]
pub enum MaterialKind {
    #[default]
    Slide = 0,
    Supplementary = 1,
}

impl From<MaterialKind> for i16 {
    fn from(kind: MaterialKind) -> Self {
        kind as i16
    }
}

impl TryFrom<i16> for MaterialKind {
    type Error = String;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MaterialKind::Slide),
            1 => Ok(MaterialKind::Supplementary),
            other => Err(format!("Invalid material kind: {}", other)),
        }
    }
}

/// A downloadable course material
///
/// Students only see a material once `publish_at` has passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Material {
    pub id: i64,
    pub course_id: i64,
    pub name: String,
    pub filename: String,
    pub kind: MaterialKind,
    pub publish_at: DateTime<Utc>,
    pub lecture_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialDraft {
    pub name: String,
    pub filename: String,
    #[serde(default)]
    pub kind: MaterialKind,
    pub publish_at: DateTime<Utc>,
    pub lecture_at: DateTime<Utc>,
}

impl MaterialDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("filename", &self.filename)
    }
}

impl Material {
    pub fn apply(&mut self, draft: MaterialDraft) {
        self.name = draft.name;
        self.filename = draft.filename;
        self.kind = draft.kind;
        self.publish_at = draft.publish_at;
        self.lecture_at = draft.lecture_at;
    }

    /// True once the publish time lies strictly in the past
    pub fn is_published(&self, now: DateTime<Utc>) -> bool {
        now - self.publish_at > chrono::Duration::zero()
    }
}
