// User domain module
// Accounts, profiles and credential-related value objects

#![allow(clippy::module_inception)]

pub mod user;
pub mod value_objects;

pub use user::{AccountDraft, NewUser, ProfileDraft, User};
pub use value_objects::Email;
