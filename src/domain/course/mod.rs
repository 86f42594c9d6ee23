// Course domain module
// Courses, per-course roles and enrollments

#![allow(clippy::module_inception)]

pub mod course;
pub mod enrollment;
pub mod role;

pub use course::{Course, CourseDraft};
pub use enrollment::Enrollment;
pub use role::CourseRole;
