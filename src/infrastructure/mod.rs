// Infrastructure layer module
// Contains database adapters and external service integrations
// Follows Hexagonal Architecture

pub mod files;
pub mod mail;
pub mod repositories;
