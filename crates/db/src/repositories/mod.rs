//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod listing_repo;
pub mod session_repo;
pub mod user_repo;

pub use listing_repo::ListingRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
