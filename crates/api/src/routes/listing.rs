//! Route definitions for the `/listings` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::listing;
use crate::state::AppState;

/// Routes mounted at `/listings`.
///
/// ```text
/// GET    /                   -> list_listings (public)
/// POST   /                   -> create_listing
/// GET    /user/my-listings   -> my_listings
/// GET    /{id}               -> get_listing (public)
/// PUT    /{id}               -> update_listing (owner or admin)
/// DELETE /{id}               -> delete_listing (owner or admin)
/// GET    /{id}/display       -> display_listing (public)
/// PATCH  /{id}/verify        -> verify_listing (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(listing::list_listings).post(listing::create_listing),
        )
        .route("/user/my-listings", get(listing::my_listings))
        .route(
            "/{id}",
            get(listing::get_listing)
                .put(listing::update_listing)
                .delete(listing::delete_listing),
        )
        .route("/{id}/display", get(listing::display_listing))
        .route("/{id}/verify", patch(listing::verify_listing))
}
