//! PropGo domain core.
//!
//! Pure logic shared by the persistence and HTTP layers: the declarative
//! field-validation engine, area-unit normalization, listing form rules,
//! search filter buckets, and the nearby-city lookup. Nothing in this crate
//! performs I/O.

pub mod error;
pub mod geo;
pub mod listing;
pub mod search;
pub mod types;
pub mod units;
pub mod validation;
