//! Row models and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the database
//! row plus the DTOs used to insert or patch it.

pub mod listing;
pub mod session;
pub mod user;
