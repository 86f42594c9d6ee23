use serde::{Deserialize, Serialize};

use super::role::CourseRole;

/// A user's membership in a course, joined with the user's profile
///
/// Unique per `(user_id, course_id)`. The profile columns are what the
/// visibility filter redacts before an enrollment list leaves the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Enrollment {
    pub user_id: i64,
    pub course_id: i64,
    pub role: CourseRole,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub student_number: String,
    pub semester: i32,
    pub subject: String,
}
