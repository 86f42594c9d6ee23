//! Course-scoped authorization
//!
//! Three steps decide what a principal may do inside a course:
//! - [`resolver`] looks up the principal's enrollment role,
//! - [`gate`] turns that role into an allow/deny decision,
//! - [`visibility`] redacts list payloads for the viewer's role.
//!
//! Global root principals skip the lookup and act as course admins.

pub mod gate;
pub mod resolver;
pub mod visibility;

pub use gate::{authorize, decide, require_root, AccessError};
pub use resolver::{resolve_role, RoleResolution};
pub use visibility::{
    can_view_material, filter_enrollments, filter_materials, visible_enrollment_roles,
};

use crate::domain::course::CourseRole;

/// Any enrolled role
pub const ANY_ROLE: &[CourseRole] = &CourseRole::ALL;

pub const ADMIN_ONLY: &[CourseRole] = &[CourseRole::Admin];

/// Roles allowed to leave a course on their own
pub const STUDENT_OR_ADMIN: &[CourseRole] = &[CourseRole::Student, CourseRole::Admin];

