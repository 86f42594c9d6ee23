// Request handlers, one module per resource

pub mod accounts;
pub mod auth;
pub mod courses;
pub mod enrollments;
pub mod groups;
pub mod materials;
