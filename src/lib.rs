//! Lecturehall API Library
//!
//! Course management backend: accounts, courses, groups and materials,
//! with course-scoped role checks deciding who may read or change what.

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod state;
