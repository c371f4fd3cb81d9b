//! Route definitions for the `/cities` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::geo;
use crate::state::AppState;

/// Routes mounted at `/cities`.
///
/// ```text
/// GET /nearby    -> nearby
/// GET /nearest   -> nearest
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/nearby", get(geo::nearby))
        .route("/nearest", get(geo::nearest))
}
