//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::ensure_owner_or_admin`] -- Ownership check for listing mutations.

pub mod auth;
pub mod rbac;
