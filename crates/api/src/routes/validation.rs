//! Route definitions for the `/validate` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::validation;
use crate::state::AppState;

/// Routes mounted at `/validate`.
///
/// ```text
/// POST /listing         -> validate_listing_payload
/// GET  /listing/rules   -> listing_rules
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/listing", post(validation::validate_listing_payload))
        .route("/listing/rules", get(validation::listing_rules))
}
