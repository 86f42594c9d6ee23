use chrono::{DateTime, Utc};

use crate::domain::course::{CourseRole, Enrollment};
use crate::domain::material::Material;

/// Redacts enrollment fields the viewer is not allowed to see
///
/// - Students see no email addresses.
/// - Everyone below admin sees no student number, semester or subject.
/// - Admins see everything.
///
/// Works on the response projection. Callers pass owned copies, the stored
/// rows stay untouched.
pub fn filter_enrollments(mut enrollments: Vec<Enrollment>, viewer: CourseRole) -> Vec<Enrollment> {
    match viewer {
        CourseRole::Admin => enrollments,
        CourseRole::Tutor | CourseRole::Student => {
            for enrollment in enrollments.iter_mut() {
                if viewer == CourseRole::Student {
                    enrollment.email.clear();
                }
                enrollment.student_number.clear();
                enrollment.semester = 0;
                enrollment.subject.clear();
            }
            enrollments
        }
    }
}

/// Which enrollment roles a viewer may list
///
/// Students only ever get the course staff, whatever they asked for.
/// An empty `requested` list means all roles.
pub fn visible_enrollment_roles(viewer: CourseRole, requested: &[CourseRole]) -> Vec<CourseRole> {
    match viewer {
        CourseRole::Student => vec![CourseRole::Tutor, CourseRole::Admin],
        CourseRole::Tutor | CourseRole::Admin => {
            if requested.is_empty() {
                CourseRole::ALL.to_vec()
            } else {
                requested.to_vec()
            }
        }
    }
}

/// Whether `viewer` may see `material` at `now`
pub fn can_view_material(material: &Material, viewer: CourseRole, now: DateTime<Utc>) -> bool {
    match viewer {
        CourseRole::Student => material.is_published(now),
        CourseRole::Tutor | CourseRole::Admin => true,
    }
}

/// Drops materials a student may not see yet
pub fn filter_materials(
    materials: Vec<Material>,
    viewer: CourseRole,
    now: DateTime<Utc>,
) -> Vec<Material> {
    materials
        .into_iter()
        .filter(|material| can_view_material(material, viewer, now))
        .collect()
}
