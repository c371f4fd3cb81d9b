pub mod auth;
pub mod geo;
pub mod listing;
pub mod user;
pub mod validation;
