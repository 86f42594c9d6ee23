// Domain layer module exports
// Following Hexagonal Architecture and DDD principles
// Domain is independent of HTTP and storage concerns

pub mod access;
pub mod course;
pub mod errors;
pub mod group;
pub mod material;
pub mod principal;
pub mod repositories;
pub mod user;

pub use errors::{RepositoryError, RepositoryResult, ValidationError};
