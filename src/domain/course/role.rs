use serde::{Deserialize, Serialize};
use std::fmt;

/// A user's role inside a single course
///
/// Stored and serialized as a small integer:
/// ```text
/// 0 = Student, 1 = Tutor, 2 = Admin
/// ```
///
/// # Example
/// ```
/// use lecturehall_api::domain::course::CourseRole;
///
/// assert_eq!(CourseRole::try_from(1), Ok(CourseRole::Tutor));
/// assert_eq!(i16::from(CourseRole::Admin), 2);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(into = "i16", try_from = "i16")]
#[repr(i16)]
pub enum CourseRole {
    Student = 0,
    Tutor = 1,
    Admin = 2,
}

impl CourseRole {
    pub const ALL: [CourseRole; 3] = [CourseRole::Student, CourseRole::Tutor, CourseRole::Admin];

    /// Parses a comma separated role list such as `0,1`
    ///
    /// Empty segments are ignored and duplicates collapse.
    pub fn parse_list(raw: &str) -> Result<Vec<CourseRole>, String> {
        let mut roles = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let value: i16 = part
                .parse()
                .map_err(|_| format!("Invalid role: {}", part))?;
            let role = CourseRole::try_from(value)?;
            if !roles.contains(&role) {
                roles.push(role);
            }
        }
        roles.sort();
        Ok(roles)
    }
}

impl From<CourseRole> for i16 {
    fn from(role: CourseRole) -> Self {
        role as i16
    }
}

impl TryFrom<i16> for CourseRole {
    type Error = String;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CourseRole::Student),
            1 => Ok(CourseRole::Tutor),
            2 => Ok(CourseRole::Admin),
            other => Err(format!("Invalid role: {}", other)),
        }
    }
}

impl fmt::Display for CourseRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CourseRole::Student => write!(f, "student"),
            CourseRole::Tutor => write!(f, "tutor"),
            CourseRole::Admin => write!(f, "admin"),
        }
    }
}
